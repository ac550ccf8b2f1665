//! # 批量执行器
//!
//! 发现输入文件、映射输出路径、并行执行转换并汇总报告。
//!
//! ## 功能
//! - 单文件 / 目录两种输入（单文件即大小为 1 的批次）
//! - 输出路径冲突检测（转换开始前即失败）
//! - 基于 rayon 的有界并行，结果按发现顺序返回
//! - 协作式取消：每个文件开始前检查
//! - 进度条与逐文件回调
//!
//! ## 依赖关系
//! - 被 `commands/`, `server/` 调用
//! - 使用 `batch/collector.rs`, `batch/mapper.rs`, `converter.rs`
//! - 使用 `utils/progress.rs` 创建进度条

use crate::batch::collector::{FileCollector, DEFAULT_PATTERN};
use crate::batch::mapper;
use crate::converter::FileConverter;
use crate::error::{ConverterError, Result};
use crate::models::{BatchReport, ConversionKind, ConversionOutcome, ConversionRequest};
use crate::utils::progress;

use indicatif::ProgressBar;
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// 协作式取消信号
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// 一次批处理的参数
#[derive(Debug, Clone)]
pub struct BatchSpec {
    /// 输入文件或目录
    pub input: PathBuf,
    /// 输出目录；单文件模式下为输出文件路径
    pub output: PathBuf,
    pub kind: ConversionKind,
    pub recursive: bool,
    /// 源格式 glob 模式
    pub pattern: String,
}

impl BatchSpec {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>, kind: ConversionKind) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            kind,
            recursive: false,
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }

    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }
}

type OutcomeObserver = Box<dyn Fn(&ConversionOutcome) + Send + Sync>;

/// 批量执行器
pub struct BatchRunner {
    /// 并行作业数
    jobs: usize,
    show_progress: bool,
    cancel: CancelToken,
    observer: Option<OutcomeObserver>,
    converter: FileConverter,
}

impl BatchRunner {
    /// 创建新的批量执行器，`jobs == 0` 时使用全部 CPU
    pub fn new(jobs: usize) -> Self {
        let jobs = if jobs == 0 { num_cpus::get() } else { jobs };
        Self {
            jobs,
            show_progress: false,
            cancel: CancelToken::new(),
            observer: None,
            converter: FileConverter::new(),
        }
    }

    /// 是否显示进度条
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// 使用外部取消信号
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 每个文件完成后的回调（进度条暂停期间调用）
    pub fn on_outcome<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ConversionOutcome) + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// 发现输入并生成转换请求；所有批量级前置条件在此检查
    pub fn plan(&self, spec: &BatchSpec) -> Result<Vec<ConversionRequest>> {
        if !spec.input.exists() {
            return Err(ConverterError::NotFound {
                path: spec.input.display().to_string(),
            });
        }

        let collector = FileCollector::new(&spec.input)
            .with_pattern(&spec.pattern)?
            .recursive(spec.recursive);

        if spec.input.is_file() {
            if !collector.matches(&spec.input) {
                return Err(ConverterError::UnsupportedFormat(format!(
                    "input file '{}' does not match '{}'",
                    spec.input.display(),
                    spec.pattern
                )));
            }
            return Ok(vec![ConversionRequest::new(
                &spec.input,
                &spec.output,
                spec.kind,
            )]);
        }

        let files = collector.collect();
        debug!(count = files.len(), input = %spec.input.display(), "discovered files");

        let mut requests = Vec::with_capacity(files.len());
        let mut seen: HashMap<PathBuf, PathBuf> = HashMap::with_capacity(files.len());

        for file in files {
            let output = mapper::map_path(&spec.input, &spec.output, &file, spec.kind)?;
            if let Some(first) = seen.get(&output) {
                return Err(ConverterError::DestinationCollision {
                    first: first.display().to_string(),
                    second: file.display().to_string(),
                    output: output.display().to_string(),
                });
            }
            seen.insert(output.clone(), file.clone());
            requests.push(ConversionRequest::new(file, output, spec.kind));
        }

        Ok(requests)
    }

    /// 执行一次完整批处理
    pub fn run_batch(&self, spec: &BatchSpec) -> Result<BatchReport> {
        let requests = self.plan(spec)?;
        self.run_planned(spec, requests)
    }

    /// 执行 `plan` 生成的请求
    pub fn run_planned(
        &self,
        spec: &BatchSpec,
        requests: Vec<ConversionRequest>,
    ) -> Result<BatchReport> {
        if self.cancel.is_cancelled() {
            return Err(ConverterError::Cancelled);
        }
        if spec.input.is_dir() {
            ensure_dir(&spec.output).map_err(|e| ConverterError::FileWriteError {
                path: spec.output.display().to_string(),
                source: e,
            })?;
        }

        info!(
            files = requests.len(),
            kind = %spec.kind,
            jobs = self.jobs,
            "starting batch"
        );
        self.convert_all(requests)
    }

    /// 转换已生成的请求，按需创建每个目标的父目录
    pub fn convert_all(&self, requests: Vec<ConversionRequest>) -> Result<BatchReport> {
        let converter = &self.converter;
        self.run(requests, |request| {
            match ensure_parent_dir(&request.output_path) {
                Ok(()) => converter.convert(request),
                Err(e) => ConversionOutcome::failed(request.clone(), &e),
            }
        })
    }

    /// 并行处理请求列表，结果按输入顺序排列
    pub fn run<F>(&self, requests: Vec<ConversionRequest>, processor: F) -> Result<BatchReport>
    where
        F: Fn(&ConversionRequest) -> ConversionOutcome + Sync + Send,
    {
        let pb = if self.show_progress {
            progress::create_progress_bar(requests.len() as u64, "Converting")
        } else {
            ProgressBar::hidden()
        };

        // 配置 rayon 线程池
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| ConverterError::Other(format!("failed to start worker pool: {}", e)))?;

        let results: Vec<Option<ConversionOutcome>> = pool.install(|| {
            requests
                .par_iter()
                .map(|request| {
                    if self.cancel.is_cancelled() {
                        return None;
                    }

                    let outcome = processor(request);
                    if let Some(observer) = &self.observer {
                        pb.suspend(|| observer(&outcome));
                    }
                    pb.inc(1);
                    Some(outcome)
                })
                .collect()
        });

        pb.finish_and_clear();

        let cancelled = results.iter().any(Option::is_none);
        let mut report: BatchReport = results.into_iter().flatten().collect();
        report.cancelled = cancelled;

        info!(
            total = report.total,
            succeeded = report.succeeded,
            cancelled = report.cancelled,
            "batch finished"
        );

        Ok(report)
    }
}

/// 创建目标文件的所有父目录
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            ensure_dir(parent).map_err(|e| ConverterError::WriteFailure {
                path: parent.display().to_string(),
                source: e,
            })
        }
        _ => Ok(()),
    }
}

/// 幂等创建目录，并发创建同一目录不视为错误
fn ensure_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testutil;
    use std::sync::atomic::AtomicUsize;
    use tempfile::TempDir;

    #[test]
    fn test_partial_failure_accounting() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        for name in ["a.png", "c.png", "e.png"] {
            testutil::write_png(&input.join(name), 10, 10);
        }
        for name in ["b.png", "d.png"] {
            testutil::write_corrupt(&input.join(name));
        }

        let spec = BatchSpec::new(&input, dir.path().join("out"), ConversionKind::WebP);
        let report = BatchRunner::new(2).run_batch(&spec).unwrap();

        assert_eq!(report.total, 5);
        assert_eq!(report.succeeded, 3);
        assert!(!report.cancelled);

        let failed: Vec<_> = report.failures().collect();
        assert_eq!(failed.len(), 2);
        for outcome in failed {
            assert_eq!(outcome.error_kind, Some(ErrorKind::DecodeFailure));
            assert!(outcome.error.as_deref().unwrap().starts_with("decode failed:"));
        }

        let retry: Vec<_> = report
            .failed_requests()
            .iter()
            .map(|r| r.input_path.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(retry, vec!["b.png", "d.png"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let spec = BatchSpec::new(dir.path(), dir.path().join("out"), ConversionKind::Pdf);
        let report = BatchRunner::new(1).run_batch(&spec).unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.succeeded, 0);
    }

    #[test]
    fn test_recursive_mirrors_tree() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("R");
        let output = dir.path().join("O");
        testutil::write_png(&input.join("a.png"), 4, 4);
        testutil::write_png(&input.join("sub/b.png"), 4, 4);

        let flat = BatchRunner::new(1)
            .run_batch(&BatchSpec::new(&input, &output, ConversionKind::Pdf))
            .unwrap();
        assert_eq!(flat.total, 1);

        let deep = BatchRunner::new(1)
            .run_batch(&BatchSpec::new(&input, &output, ConversionKind::Pdf).recursive(true))
            .unwrap();
        assert_eq!(deep.succeeded, 2);
        assert!(output.join("a.pdf").is_file());
        assert!(output.join("sub/b.pdf").is_file());
    }

    #[test]
    fn test_outcomes_follow_discovery_order() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        for i in 0..12 {
            testutil::write_png(&input.join(format!("shared/img{:02}.png", i)), 8, 8);
        }

        let spec = BatchSpec::new(&input, dir.path().join("out"), ConversionKind::WebP).recursive(true);
        let report = BatchRunner::new(4).run_batch(&spec).unwrap();

        assert_eq!(report.succeeded, 12);
        let inputs: Vec<_> = report.outcomes.iter().map(|o| o.request.input_path.clone()).collect();
        let mut sorted = inputs.clone();
        sorted.sort();
        assert_eq!(inputs, sorted);
    }

    #[test]
    fn test_collision_fails_before_converting() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in");
        testutil::write_png(&input.join("a.png"), 2, 2);
        testutil::write_png(&input.join("a.jpg"), 2, 2);
        let output = dir.path().join("out");

        let spec = BatchSpec::new(&input, &output, ConversionKind::WebP).with_pattern("*.png,*.jpg");
        let err = BatchRunner::new(1).run_batch(&spec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DestinationCollision);
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let spec = BatchSpec::new(dir.path().join("ghost"), dir.path().join("out"), ConversionKind::Pdf);
        let err = BatchRunner::new(1).run_batch(&spec).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_single_file_mode() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("one.png");
        testutil::write_png(&input, 5, 3);
        let output = dir.path().join("nested/dir/custom-name.pdf");

        let report = BatchRunner::new(1)
            .run_batch(&BatchSpec::new(&input, &output, ConversionKind::Pdf))
            .unwrap();
        assert_eq!((report.total, report.succeeded), (1, 1));
        assert!(output.is_file());
    }

    #[test]
    fn test_single_file_wrong_format() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("photo.jpg");
        std::fs::write(&input, b"jpeg").unwrap();

        let err = BatchRunner::new(1)
            .run_batch(&BatchSpec::new(&input, dir.path().join("x.pdf"), ConversionKind::Pdf))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_cancel_between_files() {
        let requests: Vec<_> = (0..5)
            .map(|i| ConversionRequest::new(format!("{}.png", i), format!("{}.pdf", i), ConversionKind::Pdf))
            .collect();

        let cancel = CancelToken::new();
        let trip = cancel.clone();
        let calls = AtomicUsize::new(0);

        let report = BatchRunner::new(1)
            .with_cancel(cancel)
            .run(requests, |request| {
                calls.fetch_add(1, Ordering::SeqCst);
                trip.cancel();
                ConversionOutcome::succeeded(request.clone())
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.total, 1);
        assert_eq!(report.outcomes.len(), report.total);
        assert!(report.cancelled);
        assert!(!report.is_complete_success());
    }

    #[test]
    fn test_cancelled_before_start() {
        let dir = TempDir::new().unwrap();
        testutil::write_png(&dir.path().join("in/a.png"), 2, 2);
        let output = dir.path().join("out");

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = BatchRunner::new(1)
            .with_cancel(cancel)
            .run_batch(&BatchSpec::new(dir.path().join("in"), &output, ConversionKind::Pdf))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(!output.exists());
    }

    #[test]
    fn test_observer_sees_every_outcome() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.png", "c.png"] {
            testutil::write_png(&dir.path().join("in").join(name), 3, 3);
        }

        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let report = BatchRunner::new(2)
            .on_outcome(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .run_batch(&BatchSpec::new(
                dir.path().join("in"),
                dir.path().join("out"),
                ConversionKind::WebP,
            ))
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), report.total);
    }

    #[test]
    fn test_concurrent_dir_creation() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("a/b/c");
        let results: Vec<_> = (0..16)
            .into_par_iter()
            .map(|i| ensure_parent_dir(&target.join(format!("{}.pdf", i))))
            .collect();
        assert!(results.iter().all(|r| r.is_ok()));
        assert!(target.is_dir());
    }
}
