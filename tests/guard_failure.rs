mod common;

use common::FakeFsId;
use persona::constants::PROBE_ID;
use persona::guard::IdentityGuard;
use persona::types::{ErrorKind, FsIdentity};

#[test]
fn silent_uid_failure_rolls_back_group_and_fails() {
    let fake = FakeFsId::denying(1000, 1000, &[501], &[]);
    let err =
        IdentityGuard::acquire(&fake, FsIdentity::new(501, 502)).expect_err("uid change must fail");
    assert_eq!(err.kind, ErrorKind::SwitchFailed);
    assert_eq!(fake.current(), FsIdentity::new(1000, 1000));
    // The group id switched first and was rolled back once user-id
    // verification detected the silent failure.
    assert_eq!(
        fake.mutations(),
        vec![("fsgid", 1000, 502), ("fsgid", 502, 1000)]
    );
}

#[test]
fn silent_gid_failure_leaves_identity_untouched() {
    let fake = FakeFsId::denying(1000, 1000, &[], &[502]);
    let err =
        IdentityGuard::acquire(&fake, FsIdentity::new(501, 502)).expect_err("gid change must fail");
    assert_eq!(err.kind, ErrorKind::SwitchFailed);
    assert_eq!(fake.current(), FsIdentity::new(1000, 1000));
    assert!(fake.mutations().is_empty());
}

#[test]
fn probe_id_is_rejected_as_a_target() {
    let fake = FakeFsId::new(1000, 1000);
    let err = IdentityGuard::acquire(&fake, FsIdentity::new(PROBE_ID, 502))
        .expect_err("probe id must be rejected");
    assert_eq!(err.kind, ErrorKind::SwitchFailed);
    assert!(fake.mutations().is_empty());
}

#[test]
fn probe_id_applied_as_real_id_is_reasserted() {
    let fake = FakeFsId::probe_defective(1000, 1000);
    {
        let guard = IdentityGuard::acquire(&fake, FsIdentity::new(501, 502))
            .expect("acquire succeeds despite the defect");
        assert!(guard.switched());
        // The defective platform briefly applied the probe id during each
        // verification; the re-apply left the target in effect.
        assert_eq!(fake.current(), FsIdentity::new(501, 502));
        assert_eq!(
            fake.mutations(),
            vec![
                ("fsgid", 1000, 502),
                ("fsgid", 502, PROBE_ID),
                ("fsgid", PROBE_ID, 502),
                ("fsuid", 1000, 501),
                ("fsuid", 501, PROBE_ID),
                ("fsuid", PROBE_ID, 501),
            ]
        );
    }
    // Restoration goes through the same corrected primitive.
    assert_eq!(fake.current(), FsIdentity::new(1000, 1000));
}
