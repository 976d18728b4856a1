//! Promotion Pipeline Filesystem Tests

use std::fs;

use decalstudio_core::{
    content::LayerContent,
    model::{DesignLayer, DesignSession, LayerKind, PrintSide, ProductKind, ProductMode, ProductSize},
    promotion::{sweep_stale, PromotionPipeline},
};
use tempfile::TempDir;

fn session_with_staged(temp_path: &str) -> (DesignSession, String) {
    let mut session = DesignSession::new(
        ProductKind::Garment,
        ProductMode::DecalOnly,
        ProductSize::M,
        "white",
    );
    let mut content = LayerContent::staged(temp_path);
    if let LayerContent::Staged {
        original_file_name, ..
    } = &mut content
    {
        *original_file_name = Some("upload.png".to_string());
    }
    let id = session.add_layer(DesignLayer::image(content, PrintSide::Front));
    (session, id)
}

fn stage_file(root: &TempDir, rel: &str, bytes: &[u8]) {
    let path = root.path().join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, bytes).unwrap();
}

#[test]
fn promote_moves_file_and_rewrites_content() {
    let temp = TempDir::new().unwrap();
    let perm = TempDir::new().unwrap();
    stage_file(&temp, "sess-1/upload.png", b"png bytes");

    let (mut session, layer_id) = session_with_staged("/sess-1/upload.png");
    let pipeline = PromotionPipeline::new(temp.path(), perm.path());
    let report = pipeline.promote_session(&mut session, "owner-1", "design-9");

    assert_eq!(report.promoted, vec![layer_id.clone()]);
    assert!(report.fully_promoted());

    // Temp file is gone, permanent file exists.
    assert!(!temp.path().join("sess-1/upload.png").exists());
    let dest = perm
        .path()
        .join("owner-1/design-9")
        .join(format!("{layer_id}.png"));
    assert_eq!(fs::read(dest).unwrap(), b"png bytes");

    match &session.layer(&layer_id).unwrap().content {
        LayerContent::Permanent {
            file_path,
            content_hash,
        } => {
            assert_eq!(file_path, &format!("/owner-1/design-9/{layer_id}.png"));
            assert!(content_hash.is_some());
        }
        other => panic!("expected permanent content, got {other:?}"),
    }
}

#[test]
fn second_promotion_of_same_reference_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let perm = TempDir::new().unwrap();
    stage_file(&temp, "sess-1/upload.png", b"png bytes");

    let (mut session, layer_id) = session_with_staged("/sess-1/upload.png");
    // A stale copy still holding the staged reference, as a retried save
    // would submit.
    let mut stale_session = session.clone();

    let pipeline = PromotionPipeline::new(temp.path(), perm.path());
    let first = pipeline.promote_session(&mut session, "owner-1", "design-9");
    assert!(first.fully_promoted());

    let second = pipeline.promote_session(&mut stale_session, "owner-1", "design-9");
    assert_eq!(second.failed.len(), 1);
    assert_eq!(second.failed[0].layer_id, layer_id);

    // The stale layer is untouched and the promoted file is intact.
    assert!(stale_session.layer(&layer_id).unwrap().content.is_staged());
    assert!(perm
        .path()
        .join("owner-1/design-9")
        .join(format!("{layer_id}.png"))
        .exists());
}

#[test]
fn one_failure_does_not_abort_the_save() {
    let temp = TempDir::new().unwrap();
    let perm = TempDir::new().unwrap();
    stage_file(&temp, "sess-1/good.png", b"good");

    let (mut session, good_id) = session_with_staged("/sess-1/good.png");
    let bad_id = session.add_layer(DesignLayer::image(
        LayerContent::staged("/sess-1/missing.png"),
        PrintSide::Front,
    ));

    let pipeline = PromotionPipeline::new(temp.path(), perm.path());
    let report = pipeline.promote_session(&mut session, "owner-1", "design-9");

    assert_eq!(report.promoted, vec![good_id.clone()]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].layer_id, bad_id);
    assert!(!session.layer(&good_id).unwrap().content.is_staged());
    assert!(session.layer(&bad_id).unwrap().content.is_staged());
}

#[test]
fn remote_and_permanent_content_is_skipped() {
    let temp = TempDir::new().unwrap();
    let perm = TempDir::new().unwrap();

    let mut session = DesignSession::new(
        ProductKind::Bag,
        ProductMode::Combo,
        ProductSize::M,
        "natural",
    );
    session.add_layer(DesignLayer::new(
        LayerKind::Sticker,
        LayerContent::remote("https://cdn.example.com/s.png"),
        PrintSide::Front,
    ));
    session.add_layer(DesignLayer::image(
        LayerContent::permanent("/owner-1/design-9/already.png"),
        PrintSide::Front,
    ));
    session.add_layer(DesignLayer::text("plain text", PrintSide::Front));

    let pipeline = PromotionPipeline::new(temp.path(), perm.path());
    let report = pipeline.promote_session(&mut session, "owner-1", "design-9");

    assert!(report.promoted.is_empty());
    assert!(report.failed.is_empty());
    // Only binary-carrying layers count as skipped; text is not considered.
    assert_eq!(report.skipped, 2);
}

#[test]
fn sweep_removes_only_stale_sessions() {
    let temp = TempDir::new().unwrap();
    stage_file(&temp, "sess-old/a.png", b"a");
    stage_file(&temp, "sess-new/b.png", b"b");

    // Everything is younger than an hour.
    let report = sweep_stale(temp.path(), chrono::Duration::hours(1)).unwrap();
    assert!(report.removed.is_empty());
    assert_eq!(report.kept, 2);

    // With a zero threshold every session is stale, promotion status or not.
    std::thread::sleep(std::time::Duration::from_millis(20));
    let report = sweep_stale(temp.path(), chrono::Duration::zero()).unwrap();
    assert_eq!(report.removed.len(), 2);
    assert!(!temp.path().join("sess-old").exists());
}

#[test]
fn sweep_of_missing_root_is_empty() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");
    let report = sweep_stale(&missing, chrono::Duration::hours(1)).unwrap();
    assert!(report.removed.is_empty());
    assert_eq!(report.kept, 0);
}
