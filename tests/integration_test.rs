use serde_json::json;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vqa_v2_loader::clients::DownloadClient;
use vqa_v2_loader::models::{ResourceKind, ResourceMap};
use vqa_v2_loader::orchestrator::drain_split;
use vqa_v2_loader::services::ExportWriter;
use vqa_v2_loader::utils::logging;
use vqa_v2_loader::{
    App, Config, DownloadManager, Split, SplitGenerator, SplitPaths, VqaRecord, VqaV2Builder,
};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// 把若干 (条目名, 内容) 写成 zip
fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap();
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// 本地镜像：val、test-dev、test 三个划分的最小化压缩包
struct Mirror {
    dir: TempDir,
    resources: ResourceMap,
}

impl Mirror {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let val_questions = json!({"questions": [
            {"question_id": 1, "image_id": 9, "question": "What?"},
            {"question_id": 2, "image_id": 9, "question": "Where?"}
        ]});
        let val_annotations = json!({"annotations": [
            {
                "question_id": 2, "image_id": 9, "question_type": "where",
                "multiple_choice_answer": "park",
                "answers": [{"answer": "park", "answer_confidence": "yes", "answer_id": 1}],
                "answer_type": "other"
            },
            {
                "question_id": 1, "image_id": 9, "question_type": "what",
                "multiple_choice_answer": "a",
                "answers": [{"answer": "a", "answer_confidence": "yes", "answer_id": 1}],
                "answer_type": "other"
            }
        ]});
        let test_dev_questions = json!({"questions": [
            {"question_id": 100, "image_id": 7, "question": "Who?"}
        ]});
        let test_questions = json!({"questions": [
            {"question_id": 100, "image_id": 7, "question": "Who?"},
            {"question_id": 101, "image_id": 8, "question": "Why?"}
        ]});

        let questions_val = root.join("v2_Questions_Val_mscoco.zip");
        write_zip(
            &questions_val,
            &[(
                "v2_OpenEnded_mscoco_val2014_questions.json",
                val_questions.to_string().into_bytes(),
            )],
        );

        let annotations_val = root.join("v2_Annotations_Val_mscoco.zip");
        write_zip(
            &annotations_val,
            &[(
                "v2_mscoco_val2014_annotations.json",
                val_annotations.to_string().into_bytes(),
            )],
        );

        // test-dev 与 test 共用同一个问题压缩包
        let questions_test = root.join("v2_Questions_Test_mscoco.zip");
        write_zip(
            &questions_test,
            &[
                (
                    "v2_OpenEnded_mscoco_test-dev2015_questions.json",
                    test_dev_questions.to_string().into_bytes(),
                ),
                (
                    "v2_OpenEnded_mscoco_test2015_questions.json",
                    test_questions.to_string().into_bytes(),
                ),
            ],
        );

        let images_val = root.join("val2014.zip");
        write_zip(
            &images_val,
            &[("val2014/COCO_val2014_000000000009.jpg", b"jpeg".to_vec())],
        );

        let images_test = root.join("test2015.zip");
        write_zip(
            &images_test,
            &[
                ("test2015/COCO_test2015_000000000007.jpg", b"jpeg".to_vec()),
                ("test2015/COCO_test2015_000000000008.jpg", b"jpeg".to_vec()),
            ],
        );

        let mut resources = ResourceMap::new();
        let questions = resources.entry(ResourceKind::Questions).or_default();
        questions.insert(Split::Val, file_url(&questions_val));
        questions.insert(Split::TestDev, file_url(&questions_test));
        questions.insert(Split::Test, file_url(&questions_test));
        resources
            .entry(ResourceKind::Annotations)
            .or_default()
            .insert(Split::Val, file_url(&annotations_val));
        let images = resources.entry(ResourceKind::Images).or_default();
        images.insert(Split::Val, file_url(&images_val));
        images.insert(Split::TestDev, file_url(&images_test));
        images.insert(Split::Test, file_url(&images_test));

        Self { dir, resources }
    }

    fn builder(&self) -> VqaV2Builder {
        VqaV2Builder::with_resources(self.resources.clone())
    }

    fn remove_archives(&self) {
        for entry in fs::read_dir(self.dir.path()).unwrap() {
            let path = entry.unwrap().path();
            if path.extension().is_some_and(|ext| ext == "zip") {
                fs::remove_file(path).unwrap();
            }
        }
    }
}

fn manager(cache: &Path) -> DownloadManager {
    let client = DownloadClient::new(&Config::default()).expect("创建下载客户端失败");
    DownloadManager::with_client(client, cache.to_path_buf(), 2)
}

fn read_jsonl(path: &Path) -> Vec<VqaRecord> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_prepare_and_generate_all_splits() {
    let mirror = Mirror::new();
    let cache = tempfile::tempdir().unwrap();
    let splits = [Split::Val, Split::TestDev, Split::Test];

    let generators = mirror
        .builder()
        .download_and_prepare(&manager(cache.path()), &splits)
        .await
        .expect("准备资源失败");

    let names: Vec<&str> = generators.iter().map(|g| g.name).collect();
    assert_eq!(names, vec!["validation", "testdev", "test"]);

    // 7 个 (种类, 划分) 条目只对应 5 个不同的压缩包
    let downloaded = fs::read_dir(cache.path().join("downloads")).unwrap().count();
    assert_eq!(downloaded, 5);

    let val: Vec<_> = generators[0]
        .generate()
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let keys: Vec<i64> = val.iter().map(|(key, _)| *key).collect();
    assert_eq!(keys, vec![1, 2]);
    assert_eq!(val[1].1.multiple_choice_answer.as_deref(), Some("park"));
    assert!(Path::new(&val[0].1.image).is_file(), "图片应已解压到缓存目录");

    let test_dev = generators[1].generate().unwrap().count();
    let test = generators[2].generate().unwrap().count();
    assert_eq!(test_dev, 1);
    assert_eq!(test, 2);

    assert!(generators[2].paths.annotations_path.is_none());
}

#[tokio::test]
async fn test_cached_archives_are_not_fetched_again() {
    let mirror = Mirror::new();
    let cache = tempfile::tempdir().unwrap();
    let splits = [Split::Val];

    mirror
        .builder()
        .download_and_prepare(&manager(cache.path()), &splits)
        .await
        .expect("首次准备失败");

    // 源文件消失后，完成标记仍能让第二次准备直接命中缓存
    mirror.remove_archives();

    let generators = mirror
        .builder()
        .download_and_prepare(&manager(cache.path()), &splits)
        .await
        .expect("缓存命中后准备失败");
    assert_eq!(generators[0].generate().unwrap().count(), 2);
}

#[tokio::test]
async fn test_interrupted_extraction_is_redone_from_archive() {
    let mirror = Mirror::new();
    let cache = tempfile::tempdir().unwrap();
    let splits = [Split::Val];

    mirror
        .builder()
        .download_and_prepare(&manager(cache.path()), &splits)
        .await
        .unwrap();

    let extracted: PathBuf = cache.path().join("extracted").join("val2014");
    fs::remove_dir_all(&extracted).unwrap();
    mirror.remove_archives();

    mirror
        .builder()
        .download_and_prepare(&manager(cache.path()), &splits)
        .await
        .expect("应从已下载的压缩包重新解压");
    assert!(extracted.join(".vqa_complete").is_file());
    assert!(extracted
        .join("val2014")
        .join("COCO_val2014_000000000009.jpg")
        .is_file());
}

#[tokio::test]
async fn test_missing_archive_fails_acquisition() {
    let mirror = Mirror::new();
    let cache = tempfile::tempdir().unwrap();
    mirror.remove_archives();

    let result = mirror
        .builder()
        .download_and_prepare(&manager(cache.path()), &[Split::Val])
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_drain_split_exports_jsonl() {
    let mirror = Mirror::new();
    let cache = tempfile::tempdir().unwrap();
    let export = tempfile::tempdir().unwrap();

    let generators = mirror
        .builder()
        .download_and_prepare(&manager(cache.path()), &[Split::Val, Split::Test])
        .await
        .unwrap();

    let writer = ExportWriter::new(export.path()).unwrap();
    let val_stats = drain_split(&generators[0], Some(&writer), false).unwrap();
    let test_stats = drain_split(&generators[1], Some(&writer), false).unwrap();

    assert_eq!(val_stats.records, 2);
    assert_eq!(val_stats.annotated, 2);
    assert_eq!(test_stats.records, 2);
    assert_eq!(test_stats.annotated, 0);

    let validation = read_jsonl(&export.path().join("validation.jsonl"));
    assert_eq!(validation.len(), 2);
    assert_eq!(validation[0].question, "What?");

    let test = read_jsonl(&export.path().join("test.jsonl"));
    assert!(test.iter().all(|record| !record.has_annotation()));
}

#[test]
fn test_failed_split_leaves_no_export() {
    let work = tempfile::tempdir().unwrap();
    let questions = work.path().join("questions.json");
    let annotations = work.path().join("annotations.json");
    fs::write(
        &questions,
        json!({"questions": [
            {"question_id": 1, "image_id": 9, "question": "What?"},
            {"question_id": 2, "image_id": 9, "question": "Where?"}
        ]})
        .to_string(),
    )
    .unwrap();
    // 问题 2 没有标注，生成到第二条时失败
    fs::write(
        &annotations,
        json!({"annotations": [{
            "question_id": 1, "image_id": 9, "question_type": "what",
            "multiple_choice_answer": "a",
            "answers": [{"answer": "a", "answer_confidence": "yes", "answer_id": 1}],
            "answer_type": "other"
        }]})
        .to_string(),
    )
    .unwrap();

    let generator = SplitGenerator::new(SplitPaths::new(
        Split::Val,
        questions,
        Some(annotations),
        work.path().join("val2014"),
    ));
    let export = work.path().join("export");
    let writer = ExportWriter::new(&export).unwrap();

    let result = drain_split(&generator, Some(&writer), false);

    assert!(result.is_err());
    assert!(!export.join("validation.jsonl").exists(), "失败的划分不应留下导出文件");
    assert!(!export.join("validation.jsonl.part").exists());
}

#[test]
fn test_app_run_end_to_end() {
    logging::init(false, None);

    let mirror = Mirror::new();
    let work = tempfile::tempdir().unwrap();

    let config = Config {
        cache_dir: work.path().join("cache").to_string_lossy().into_owned(),
        export_dir: Some(work.path().join("export").to_string_lossy().into_owned()),
        splits: vec![Split::Val, Split::TestDev],
        max_concurrent_downloads: 1,
        output_log_file: work.path().join("run.log").to_string_lossy().into_owned(),
        ..Config::default()
    };

    let app = App::with_builder(config, mirror.builder()).expect("初始化失败");
    let stats = tokio_test::block_on(app.run()).expect("运行失败");

    assert_eq!(stats.total_records(), 3);
    assert_eq!(stats.splits.len(), 2);
    assert_eq!(stats.splits[0].0, "validation");

    let info: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(work.path().join("export").join("dataset_info.json")).unwrap(),
    )
    .unwrap();
    assert!(info["features"].is_array() || info["features"].is_object());
    assert!(work.path().join("export").join("testdev.jsonl").is_file());
}

#[tokio::test]
#[ignore] // 默认忽略，需要联网：cargo test -- --ignored
async fn test_download_real_val_questions() {
    logging::init(true, None);

    let cache = tempfile::tempdir().unwrap();
    let mut resources = ResourceMap::new();
    let url = vqa_v2_loader::models::resource::url(ResourceKind::Questions, Split::Val)
        .expect("val 划分应有问题压缩包");
    resources
        .entry(ResourceKind::Questions)
        .or_default()
        .insert(Split::Val, url.to_string());

    let acquired = manager(cache.path())
        .download_and_extract(&resources)
        .await
        .expect("下载失败");

    let dir = acquired
        .get(ResourceKind::Questions, Split::Val)
        .expect("应有解压目录");
    assert!(dir
        .join("v2_OpenEnded_mscoco_val2014_questions.json")
        .is_file());
}
