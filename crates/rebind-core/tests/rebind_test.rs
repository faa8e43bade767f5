//! Rebinding pass against an in-memory scene.

use rebind_core::descriptor;
use rebind_core::memory_scene::{MaterialId, TextureId};
use rebind_core::{
    AssetCatalog, Error, MaterialCatalog, MaterialEntry, MaterialOutcome, MaterialRebinder,
    MemoryScene, SceneGraph, TextureCatalog, TextureEntry, TextureMapping,
};

fn catalog(textures: &[&str], materials: &[(&str, Option<i64>)]) -> AssetCatalog {
    let textures: TextureCatalog = textures.iter().copied().map(TextureEntry::new).collect();
    let materials: MaterialCatalog = materials
        .iter()
        .map(|(name, id)| MaterialEntry::new(*name, *id))
        .collect();
    AssetCatalog::new(textures, materials)
}

fn diffuse_files(scene: &MemoryScene, material: MaterialId) -> Vec<String> {
    scene
        .diffuse_textures(material)
        .unwrap()
        .into_iter()
        .filter_map(|t| scene.file_name(t).unwrap())
        .collect()
}

#[test]
fn test_binds_catalog_texture() {
    let catalog = catalog(&["tex0.png"], &[("Foo", Some(0))]);
    let mut scene = MemoryScene::new();
    let foo = scene.add_material("Foo");

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert_eq!(diffuse_files(&scene, foo), vec!["tex0.png".to_string()]);
    assert_eq!(report.bound_count(), 1);
    assert!(!report.has_errors());

    let texture = scene.diffuse_textures(foo).unwrap()[0];
    let created = scene.texture(texture).unwrap();
    assert_eq!(created.name, "Diffuse Texture");
    assert_eq!(created.mapping, Some(TextureMapping::default()));
}

#[test]
fn test_namespace_stripping() {
    let catalog = catalog(&["a.png", "b.png"], &[("Foo", Some(0)), ("Bar", Some(1))]);
    let mut scene = MemoryScene::new();
    let namespaced = scene.add_material("ns.Foo");
    let bare = scene.add_material("Bar");

    MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert_eq!(diffuse_files(&scene, namespaced), vec!["a.png".to_string()]);
    assert_eq!(diffuse_files(&scene, bare), vec!["b.png".to_string()]);
}

#[test]
fn test_unmatched_material_left_unbound() {
    let catalog = catalog(&["a.png"], &[("Foo", Some(0))]);
    let mut scene = MemoryScene::new();
    let other = scene.add_material("foo");

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert!(scene.diffuse_textures(other).unwrap().is_empty());
    assert_eq!(
        report.outcomes,
        vec![MaterialOutcome::Unmatched {
            material: "foo".to_string(),
            key: "foo".to_string()
        }]
    );
    assert!(!report.has_errors());
}

#[test]
fn test_missing_texture_id_is_not_index_zero() {
    let catalog = catalog(&["a.png"], &[("Foo", None)]);
    let mut scene = MemoryScene::new();
    let foo = scene.add_material("Foo");

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert!(scene.diffuse_textures(foo).unwrap().is_empty());
    assert_eq!(report.unmatched_count(), 1);
}

#[test]
fn test_out_of_range_index_continues() {
    let catalog = catalog(&["tex0.png"], &[("Bad", Some(5)), ("Good", Some(0))]);
    let mut scene = MemoryScene::new();
    let bad = scene.add_material("Bad");
    let good = scene.add_material("Good");

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert!(scene.diffuse_textures(bad).unwrap().is_empty());
    assert_eq!(diffuse_files(&scene, good), vec!["tex0.png".to_string()]);

    assert_eq!(report.errors.len(), 1);
    match &report.errors[0] {
        Error::CatalogLookup {
            material,
            texture_id,
            catalog_len,
        } => {
            assert_eq!(material, "Bad");
            assert_eq!(*texture_id, 5);
            assert_eq!(*catalog_len, 1);
        }
        other => panic!("expected CatalogLookup, got {:?}", other),
    }
    assert_eq!(
        report.outcomes[0],
        MaterialOutcome::LookupFailed {
            material: "Bad".to_string(),
            texture_id: 5
        }
    );
}

#[test]
fn test_negative_index_is_lookup_error() {
    let catalog = catalog(&["tex0.png"], &[("Foo", Some(-1))]);
    let mut scene = MemoryScene::new();
    scene.add_material("Foo");

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();
    assert!(matches!(report.errors[0], Error::CatalogLookup { texture_id: -1, .. }));
}

#[test]
fn test_normalizes_existing_paths() {
    let catalog = catalog(&["unused.png"], &[("Wood", Some(0))]);
    let mut scene = MemoryScene::new();
    let wood = scene.add_material("Wood");
    let tex = scene.add_file_texture("wood", r"C:\assets\tex\wood.png");
    let bare = scene.add_file_texture("bark", "bark.png");
    scene.bind_diffuse_texture(wood, tex).unwrap();
    scene.bind_diffuse_texture(wood, bare).unwrap();

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert_eq!(
        diffuse_files(&scene, wood),
        vec!["wood.png".to_string(), "bark.png".to_string()]
    );
    assert_eq!(report.normalized_count(), 1);
    assert_eq!(report.bound_count(), 0);
    match &report.outcomes[0] {
        MaterialOutcome::Normalized {
            bindings, renamed, ..
        } => {
            assert_eq!(*bindings, 2);
            assert_eq!(renamed.len(), 1);
            assert_eq!(renamed[0].texture, "wood");
            assert_eq!(renamed[0].to, "wood.png");
        }
        other => panic!("expected Normalized, got {:?}", other),
    }
}

#[test]
fn test_non_file_bindings_untouched() {
    let catalog = AssetCatalog::default();
    let mut scene = MemoryScene::new();
    let mat = scene.add_material("Mix");
    let layered = scene.add_other_texture(r"layers\top", "LayeredTexture");
    scene.bind_diffuse_texture(mat, layered).unwrap();

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert_eq!(scene.texture(layered).unwrap().name, r"layers\top");
    assert_eq!(scene.file_name(layered).unwrap(), None);
    assert_eq!(report.normalized_count(), 0);
}

#[test]
fn test_hardware_shaded_material_untouched() {
    let catalog = catalog(&["new.png"], &[("Shader", Some(0))]);
    let mut scene = MemoryScene::new();
    let mat = scene.add_hardware_material("Shader");
    let a = scene.add_file_texture("a", r"C:\x\a.png");
    let b = scene.add_file_texture("b", "/y/b.png");
    scene.bind_diffuse_texture(mat, a).unwrap();
    scene.bind_diffuse_texture(mat, b).unwrap();

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert_eq!(
        diffuse_files(&scene, mat),
        vec![r"C:\x\a.png".to_string(), "/y/b.png".to_string()]
    );
    assert_eq!(scene.texture_count(), 2);
    assert_eq!(report.skipped_count(), 1);
}

#[test]
fn test_absent_descriptor_binds_nothing_but_cleans_paths() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = descriptor::load_or_default(dir.path().join("scene.xml"));
    assert!(catalog.is_empty());

    let mut scene = MemoryScene::new();
    let foo = scene.add_material("Foo");
    let tex = scene.add_file_texture("t", r"C:\x\t.png");
    scene.bind_diffuse_texture(foo, tex).unwrap();
    let bar = scene.add_material("Bar");

    let report = MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    assert_eq!(diffuse_files(&scene, foo), vec!["t.png".to_string()]);
    assert_eq!(scene.diffuse_textures(foo).unwrap(), vec![tex]);
    assert!(scene.diffuse_textures(bar).unwrap().is_empty());
    assert_eq!(scene.texture_count(), 1);
    assert_eq!(report.bound_count(), 0);
    assert_eq!(report.normalized_count(), 1);
    assert!(!report.has_errors());
}

#[test]
fn test_descriptor_to_scene() {
    let xml = r#"<root>
        <textureList>
            <Texture><fileName>tex0.png</fileName></Texture>
        </textureList>
        <materialList>
            <Material><nameJp>Foo</nameJp><textureID>0</textureID></Material>
        </materialList>
    </root>"#;
    let catalog = descriptor::parse_str(xml).unwrap();

    let mut scene = MemoryScene::new();
    let foo = scene.add_material("Foo");
    MaterialRebinder::new(&catalog).rebind(&mut scene).unwrap();

    let bound = scene.diffuse_textures(foo).unwrap();
    assert_eq!(bound, vec![TextureId(0)]);
    assert_eq!(scene.file_name(bound[0]).unwrap().as_deref(), Some("tex0.png"));
}
