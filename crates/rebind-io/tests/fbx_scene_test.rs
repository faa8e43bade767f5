//! FBX scene write → load → rebind → export → reload.

use rebind_core::{
    AssetCatalog, Error, MaterialCatalog, MaterialEntry, MaterialRebinder, SceneFile, SceneGraph,
    TextureCatalog, TextureEntry,
};
use rebind_io::document::join_object_name;
use rebind_io::{write_fbx_document, FbxDocument, FbxNode, FbxScene, ObjectId};

fn material(id: i64, name: &str) -> FbxNode {
    FbxNode::new("Material")
        .with_property(id)
        .with_property(join_object_name(name, "Material"))
        .with_property("")
        .with_child(FbxNode::new("ShadingModel").with_property("lambert"))
}

fn scene_document(version: u32) -> FbxDocument {
    let mut doc = FbxDocument::new(version);
    doc.nodes.push(
        FbxNode::new("FBXHeaderExtension")
            .with_child(FbxNode::new("FBXVersion").with_property(version as i32)),
    );
    doc.nodes.push(
        FbxNode::new("Definitions")
            .with_child(FbxNode::new("Count").with_property(3))
            .with_child(
                FbxNode::new("ObjectType")
                    .with_property("Material")
                    .with_child(FbxNode::new("Count").with_property(2)),
            )
            .with_child(
                FbxNode::new("ObjectType")
                    .with_property("Texture")
                    .with_child(FbxNode::new("Count").with_property(1)),
            ),
    );
    doc.nodes.push(
        FbxNode::new("Objects")
            .with_child(material(10, "chara.Skin"))
            .with_child(material(11, "Cloth"))
            .with_child(
                FbxNode::new("Texture")
                    .with_property(20i64)
                    .with_property(join_object_name("cloth", "Texture"))
                    .with_property("")
                    .with_child(
                        FbxNode::new("FileName").with_property("D:/work/textures/cloth.tga"),
                    )
                    .with_child(
                        FbxNode::new("RelativeFilename").with_property("textures/cloth.tga"),
                    ),
            ),
    );
    doc.nodes.push(
        FbxNode::new("Connections").with_child(
            FbxNode::new("C")
                .with_property("OP")
                .with_property(20i64)
                .with_property(11i64)
                .with_property("DiffuseColor"),
        ),
    );
    doc
}

fn catalog() -> AssetCatalog {
    let textures: TextureCatalog = ["body.png", "skin.png"]
        .into_iter()
        .map(TextureEntry::new)
        .collect();
    let materials: MaterialCatalog = [MaterialEntry::new("Skin", Some(1))].into_iter().collect();
    AssetCatalog::new(textures, materials)
}

fn rebind_file(version: u32) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("chara.fbx");
    let output = dir.path().join("chara_rename.fbx");
    write_fbx_document(&scene_document(version), &input).unwrap();

    let mut scene = FbxScene::load(&input).unwrap();
    let report = MaterialRebinder::new(&catalog()).rebind(&mut scene).unwrap();
    assert_eq!(report.bound_count(), 1);
    assert_eq!(report.normalized_count(), 1);
    scene.export(&output).unwrap();

    let reloaded = FbxScene::load(&output).unwrap();
    assert_eq!(reloaded.document().version, version);

    let skin = ObjectId(10);
    let bound = reloaded.diffuse_textures(skin).unwrap();
    assert_eq!(bound.len(), 1);
    assert_eq!(
        reloaded.file_name(bound[0]).unwrap().as_deref(),
        Some("skin.png")
    );

    let cloth = reloaded.diffuse_textures(ObjectId(11)).unwrap();
    assert_eq!(cloth, vec![ObjectId(20)]);
    assert_eq!(
        reloaded.file_name(cloth[0]).unwrap().as_deref(),
        Some("cloth.tga")
    );
}

#[test]
fn test_rebind_roundtrip_64bit() {
    rebind_file(7500);
}

#[test]
fn test_rebind_roundtrip_32bit() {
    rebind_file(7400);
}

#[test]
fn test_uncompressed_export() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.fbx");
    write_fbx_document(&scene_document(7400), &input).unwrap();

    let mut scene = FbxScene::load(&input).unwrap();
    scene.set_compression(false);
    let output = dir.path().join("a_rename.fbx");
    scene.export(&output).unwrap();

    let reloaded = FbxScene::load(&output).unwrap();
    assert_eq!(reloaded.document(), scene.document());
}

#[test]
fn test_missing_scene_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FbxScene::load(dir.path().join("missing.fbx")).unwrap_err();
    assert!(matches!(err, Error::SceneLoad { .. }));
    assert_eq!(err.exit_code(), 3);
}

#[test]
fn test_ascii_scene_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ascii.fbx");
    std::fs::write(&path, "; FBX 7.4.0 project file\nFBXHeaderExtension:  {\n}\n").unwrap();
    assert!(matches!(
        FbxScene::load(&path).unwrap_err(),
        Error::SceneLoad { .. }
    ));
}

#[test]
fn test_export_to_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let scene = FbxScene::from_document(scene_document(7400));
    let err = scene
        .export(dir.path().join("no-such-dir").join("out.fbx"))
        .unwrap_err();
    assert!(matches!(err, Error::SceneExport { .. }));
    assert_eq!(err.exit_code(), 4);
}

#[test]
fn test_rebind_with_exhausted_ids_is_scene_error() {
    let mut doc = FbxDocument::new(7400);
    doc.nodes
        .push(FbxNode::new("Objects").with_child(material(i64::MAX, "Foo")));
    let mut scene = FbxScene::from_document(doc);

    let textures: TextureCatalog = ["foo.png"].into_iter().map(TextureEntry::new).collect();
    let materials: MaterialCatalog = [MaterialEntry::new("Foo", Some(0))].into_iter().collect();
    let catalog = AssetCatalog::new(textures, materials);

    let err = MaterialRebinder::new(&catalog)
        .rebind(&mut scene)
        .unwrap_err();
    assert!(matches!(err, Error::Scene(_)));
    assert!(scene.diffuse_textures(ObjectId(i64::MAX)).unwrap().is_empty());
}
