//! Behavioural laws of the hashing API: determinism, parameter sensitivity,
//! update and server-relief equivalences, secret hygiene, and rejection of
//! out-of-range parameters.

use mhkdf::{
    client_hash_password, hash_password, hash_password_extended, phs, server_hash_password,
    update_password, Error, HashType, Params,
};

/// Small, fast parameter set; every level fits in a few KiB.
fn params(stop_mem_cost: u8) -> Params {
    Params {
        hash_type: HashType::Blake2s,
        start_mem_cost: 0,
        stop_mem_cost,
        time_cost: 0,
        multiplies: 2,
        lanes: 8,
        parallelism: 2,
        block_size: 512,
        sub_block_size: 64,
        overwrite_cost: 0,
        side_channel_resistant: false,
    }
}

fn derive(params: &Params, out_len: usize, password: &[u8], salt: &[u8]) -> Vec<u8> {
    let mut hash = vec![0u8; out_len];
    let mut password = password.to_vec();
    hash_password_extended(&mut hash, &mut password, salt, &mut [], params, false, false)
        .expect("derivation should succeed");
    hash
}

#[test]
fn derivation_is_deterministic() {
    let a = derive(&params(6), 32, b"password", b"salt");
    let b = derive(&params(6), 32, b"password", b"salt");
    assert_eq!(a, b);

    let mut c = [0u8; 32];
    let mut d = [0u8; 32];
    hash_password(&mut c, &mut b"pw".to_vec(), b"salt", 4, false).unwrap();
    hash_password(&mut d, &mut b"pw".to_vec(), b"salt", 4, false).unwrap();
    assert_eq!(c, d);
}

#[test]
fn every_absorbed_parameter_matters() {
    let base = params(6);
    let baseline = derive(&base, 32, b"password", b"salt");
    let variants = [
        Params { time_cost: 1, ..base },
        Params { multiplies: 3, ..base },
        Params { lanes: 4, ..base },
        Params { parallelism: 3, ..base },
        Params { block_size: 1024, ..base },
        Params { sub_block_size: 32, ..base },
        Params { start_mem_cost: 1, ..base },
        Params { start_mem_cost: 1, overwrite_cost: 1, ..base },
        Params { side_channel_resistant: true, ..base },
        Params { hash_type: HashType::Sha256, ..base },
        Params { hash_type: HashType::Blake2b, ..base },
        Params { stop_mem_cost: 7, ..base },
    ];
    for v in variants {
        assert_ne!(baseline, derive(&v, 32, b"password", b"salt"), "{v:?}");
    }
    assert_ne!(baseline, derive(&base, 32, b"passwore", b"salt"));
    assert_ne!(baseline, derive(&base, 32, b"password", b"salu"));
    assert_ne!(baseline, derive(&base, 32, b"", b"salt"));
}

#[test]
fn data_field_is_absorbed() {
    let p = params(4);
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    hash_password_extended(
        &mut a,
        &mut b"pw".to_vec(),
        b"salt",
        &mut b"app".to_vec(),
        &p,
        false,
        false,
    )
    .unwrap();
    hash_password_extended(
        &mut b,
        &mut b"pw".to_vec(),
        b"salt",
        &mut b"bpp".to_vec(),
        &p,
        false,
        false,
    )
    .unwrap();
    assert_ne!(a, b);
}

#[test]
fn update_matches_a_fresh_derivation() {
    let mut updated = derive(&params(4), 32, b"password", b"salt");
    update_password(&mut updated, &params(4), 4, 6).unwrap();
    assert_eq!(updated, derive(&params(6), 32, b"password", b"salt"));
}

#[test]
fn update_via_simple_entry_points() {
    let mut low = [0u8; 32];
    hash_password(&mut low, &mut b"pw".to_vec(), b"salt", 10, false).unwrap();
    // The simple entry absorbs identical parameters at costs 10 and 11, so
    // the stored hash can be promoted in place with the same settings.
    let update_params = Params {
        multiplies: 3,
        block_size: mhkdf::DEFAULT_BLOCK_SIZE,
        sub_block_size: mhkdf::DEFAULT_SUB_BLOCK_SIZE,
        parallelism: mhkdf::DEFAULT_PARALLELISM,
        ..params(0)
    };
    update_password(&mut low, &update_params, 10, 11).unwrap();

    let mut high = [0u8; 32];
    hash_password(&mut high, &mut b"pw".to_vec(), b"salt", 11, false).unwrap();
    assert_eq!(low, high);
}

#[test]
fn update_with_equal_costs_is_a_no_op() {
    let stored = derive(&params(5), 32, b"password", b"salt");
    let mut hash = stored.clone();
    update_password(&mut hash, &params(5), 5, 5).unwrap();
    assert_eq!(hash, stored);
}

#[test]
fn update_rejects_a_cost_decrease() {
    let mut hash = [0u8; 32];
    assert!(matches!(
        update_password(&mut hash, &params(5), 6, 5),
        Err(Error::InvalidParameters(_))
    ));
}

#[test]
fn server_relief_splits_the_work() {
    let p = params(5);
    let mut split = [0u8; 32];
    client_hash_password(
        &mut split,
        &mut b"pw".to_vec(),
        b"salt",
        &mut [],
        &p,
        false,
        false,
    )
    .unwrap();
    let client_value = split;
    server_hash_password(p.hash_type, &mut split).unwrap();

    assert_eq!(split.to_vec(), derive(&p, 32, b"pw", b"salt"));
    // The client value itself must differ from the stored value.
    assert_ne!(client_value, split);
}

#[test]
fn output_lengths_are_honoured_and_independent() {
    let short = derive(&params(4), 32, b"pw", b"salt");
    let long = derive(&params(4), 64, b"pw", b"salt");
    assert_eq!(short.len(), 32);
    assert_eq!(long.len(), 64);
    // Different requested sizes are domain-separated, not prefixes.
    assert_ne!(&long[..32], &short[..]);
}

#[test]
fn password_clearing_follows_the_flag() {
    let mut cleared = b"super secret".to_vec();
    let mut hash = [0u8; 32];
    hash_password_extended(&mut hash, &mut cleared, b"salt", &mut [], &params(4), true, false)
        .unwrap();
    assert!(cleared.iter().all(|&b| b == 0));

    let mut kept = b"super secret".to_vec();
    hash_password_extended(&mut hash, &mut kept, b"salt", &mut [], &params(4), false, false)
        .unwrap();
    assert_eq!(kept, b"super secret");
}

#[test]
fn data_clearing_follows_the_flag() {
    let mut data = b"associated".to_vec();
    let mut hash = [0u8; 32];
    hash_password_extended(&mut hash, &mut b"pw".to_vec(), b"salt", &mut data, &params(4), false, true)
        .unwrap();
    assert!(data.iter().all(|&b| b == 0));
}

#[test]
fn invalid_parameters_leave_everything_untouched() {
    let bad = [
        Params { stop_mem_cost: 31, ..params(6) },
        Params { time_cost: 31, ..params(6) },
        Params { multiplies: 9, ..params(6) },
        Params { parallelism: 0, ..params(6) },
        Params { block_size: 100, ..params(6) },
        Params { block_size: 16, sub_block_size: 16, ..params(6) },
        Params { sub_block_size: 1024, ..params(6) },
        Params { lanes: 0, ..params(6) },
        Params { lanes: 20, ..params(6) },
        Params { start_mem_cost: 7, ..params(6) },
        Params { overwrite_cost: 3, ..params(6) },
    ];
    for p in bad {
        let mut hash = [0xabu8; 32];
        let mut password = b"secret".to_vec();
        let result = hash_password_extended(
            &mut hash,
            &mut password,
            b"salt",
            &mut [],
            &p,
            true,
            false,
        );
        assert!(matches!(result, Err(Error::InvalidParameters(_))), "{p:?}");
        // Early rejection: output untouched, password intact despite the
        // clear flag.
        assert_eq!(hash, [0xabu8; 32], "{p:?}");
        assert_eq!(password, b"secret", "{p:?}");
    }
}

#[test]
fn invalid_hash_sizes_are_rejected() {
    for len in [0usize, 2, 33, 4097, 8164] {
        let mut hash = vec![0u8; len];
        let result = hash_password_extended(
            &mut hash,
            &mut b"pw".to_vec(),
            b"salt",
            &mut [],
            &params(6),
            false,
            false,
        );
        assert!(matches!(result, Err(Error::InvalidParameters(_))), "{len}");
    }
}

#[test]
fn empty_password_and_salt_are_legal() {
    let a = derive(&params(4), 32, b"", b"");
    let b = derive(&params(4), 32, b"", b"");
    assert_eq!(a, b);
}

#[test]
fn phs_entry_point_behaves() {
    let mut a = [0u8; 32];
    let mut b = [0u8; 32];
    let mut c = [0u8; 32];
    phs(&mut a, b"pw", b"salt", 0, 4).unwrap();
    phs(&mut b, b"pw", b"salt", 0, 4).unwrap();
    phs(&mut c, b"pw", b"salt", 0, 5).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert!(phs(&mut a, b"pw", b"salt", 31, 4).is_err());
    assert!(phs(&mut a, b"pw", b"salt", 0, 31).is_err());
}

#[test]
fn side_channel_resistant_mode_still_derives() {
    let p = Params {
        side_channel_resistant: true,
        ..params(5)
    };
    let a = derive(&p, 32, b"pw", b"salt");
    let b = derive(&p, 32, b"pw", b"salt");
    assert_eq!(a, b);
}
