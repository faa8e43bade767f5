//! Property tests for material-name and texture-path handling.

use proptest::prelude::*;
use rebind_core::{descriptor, normalize_file_name, strip_namespace};

proptest! {
    #[test]
    fn normalize_is_idempotent(path in "[a-zA-Z0-9_ .:/\\\\-]{0,40}") {
        let once = normalize_file_name(&path);
        prop_assert_eq!(normalize_file_name(once), once);
        prop_assert!(!once.contains('/') && !once.contains('\\'));
        prop_assert!(path.ends_with(once));
    }

    #[test]
    fn bare_names_survive_normalization(name in "[a-zA-Z0-9_.-]{1,20}") {
        prop_assert_eq!(normalize_file_name(&name), name.as_str());
    }

    #[test]
    fn namespace_prefix_is_dropped(ns in "[a-zA-Z0-9_]{1,10}", name in "[a-zA-Z0-9_]{1,10}") {
        let qualified = format!("{}.{}", ns, name);
        prop_assert_eq!(strip_namespace(&qualified), name.as_str());
        prop_assert_eq!(strip_namespace(&name), name.as_str());
    }

    #[test]
    fn entry_counts_match_elements(textures in 0usize..8, materials in 0usize..8) {
        let mut xml = String::from("<root><textureList>");
        for i in 0..textures {
            xml.push_str(&format!("<Texture><fileName>t{}.png</fileName></Texture>", i));
        }
        xml.push_str("</textureList><materialList>");
        for i in 0..materials {
            xml.push_str(&format!(
                "<Material><nameJp>m{}</nameJp><textureID>{}</textureID></Material>",
                i, i
            ));
        }
        xml.push_str("</materialList></root>");

        let catalog = descriptor::parse_str(&xml).unwrap();
        prop_assert_eq!(catalog.textures.len(), textures);
        prop_assert_eq!(catalog.materials.len(), materials);
    }
}
