
#[cfg(test)]
mod tests {
    use crate::android::catalog;
    use crate::check_manifest;
    use crate::studio::{ManifestStudio, MemoryStore};

    #[test]
    fn catalog_add_action_through_studio() {
        let mut studio = ManifestStudio::with_store(MemoryStore::new());
        for entry in catalog::search("location") {
            studio.add_permission(entry.name);
        }
        let permissions = &studio.fields().permissions;
        assert_eq!(permissions.len(), 3);
        assert_eq!(permissions[0], "android.permission.ACCESS_COARSE_LOCATION");
        assert_eq!(permissions[1], "android.permission.ACCESS_FINE_LOCATION");
        assert!(studio.verdict().is_valid);
    }

    #[test]
    fn check_manifest_skips_fields_for_broken_text() {
        let (verdict, fields) = check_manifest("<manifest");
        assert!(!verdict.is_valid);
        assert!(fields.is_none());
    }
}
