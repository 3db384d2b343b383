use ferry_core::ImageReference;
use proptest::prelude::*;

#[test]
fn tag_joins_namespace_and_revision() {
    let image = ImageReference::new("acme/web", "4f2a91c");
    assert_eq!(image.tag(), "acme/web:4f2a91c");
    assert_eq!(image.to_string(), image.tag());
}

#[test]
fn accessors_expose_the_parts() {
    let image = ImageReference::new("acme/web", "4f2a91c");
    assert_eq!(image.namespace(), "acme/web");
    assert_eq!(image.revision(), "4f2a91c");
}

proptest! {
    /// Building twice from the same revision yields the identical reference.
    #[test]
    fn tagging_is_idempotent(
        namespace in "[a-z0-9]{1,12}/[a-z0-9-]{1,16}",
        revision in "[0-9a-f]{7,40}",
    ) {
        let first = ImageReference::new(namespace.clone(), revision.clone());
        let second = ImageReference::new(namespace, revision);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.tag(), second.tag());
    }
}
