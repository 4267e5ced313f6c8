use super::*;

#[test]
fn handles_revoke_on_drop() {
    let reg = BlobRegistry::new();
    let a = reg.register(vec![1u8, 2, 3]);
    let b = reg.register(vec![4u8]);
    assert_ne!(a.url(), b.url());
    assert_eq!(reg.live_count(), 2);
    assert_eq!(reg.resolve(a.url()).as_deref(), Some(&[1u8, 2, 3][..]));

    let url = a.url().to_owned();
    drop(a);
    assert_eq!(reg.live_count(), 1);
    assert!(reg.resolve(&url).is_none());

    b.revoke();
    assert_eq!(reg.live_count(), 0);
}

#[test]
fn foreign_urls_do_not_resolve() {
    let reg = BlobRegistry::new();
    let _h = reg.register(vec![0u8]);
    assert!(reg.resolve("blob:other/0").is_none());
    assert!(reg.resolve("blob:posterkit/x").is_none());
    assert!(reg.resolve("templates/a.jpg").is_none());
}
