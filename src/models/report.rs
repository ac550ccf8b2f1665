//! # 批处理报告
//!
//! 汇总一次批处理中每个文件的转换结果。
//!
//! ## 不变量
//! - `total == outcomes.len()`
//! - `succeeded == outcomes 中 success 的数量`
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 构建
//! - 被 `commands/`, `server/` 消费

use crate::error::{ConverterError, Result};
use crate::models::conversion::{ConversionOutcome, ConversionRequest};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 批处理结果统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    pub succeeded: usize,
    /// 是否因取消信号提前结束
    pub cancelled: bool,
    /// 按发现顺序排列的结果
    pub outcomes: Vec<ConversionOutcome>,
}

impl BatchReport {
    /// 追加单个结果
    pub fn push(&mut self, outcome: ConversionOutcome) {
        self.total += 1;
        if outcome.success {
            self.succeeded += 1;
        }
        self.outcomes.push(outcome);
    }

    /// 失败数量
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    /// 是否全部成功
    pub fn is_complete_success(&self) -> bool {
        !self.cancelled && self.failed() == 0
    }

    /// 失败的结果
    pub fn failures(&self) -> impl Iterator<Item = &ConversionOutcome> {
        self.outcomes.iter().filter(|o| !o.success)
    }

    /// 失败文件对应的请求，可用于重新提交
    pub fn failed_requests(&self) -> Vec<ConversionRequest> {
        self.failures().map(|o| o.request.clone()).collect()
    }

    /// 保存报告：`.json` 后缀写 JSON，其余写 CSV
    pub fn save(&self, path: &Path) -> Result<()> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json {
            let file = std::fs::File::create(path).map_err(|e| ConverterError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
            serde_json::to_writer_pretty(file, self)?;
            return Ok(());
        }

        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["input", "output", "type", "success", "error_kind", "error"])?;
        for outcome in &self.outcomes {
            wtr.write_record([
                outcome.request.input_path.display().to_string(),
                outcome.request.output_path.display().to_string(),
                outcome.request.kind.to_string(),
                outcome.success.to_string(),
                outcome.error_kind.map(|k| k.to_string()).unwrap_or_default(),
                outcome.error.clone().unwrap_or_default(),
            ])?;
        }
        wtr.flush().map_err(|e| ConverterError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }
}

impl FromIterator<ConversionOutcome> for BatchReport {
    fn from_iter<I: IntoIterator<Item = ConversionOutcome>>(iter: I) -> Self {
        let mut report = BatchReport::default();
        for outcome in iter {
            report.push(outcome);
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::conversion::ConversionKind;
    use tempfile::TempDir;

    fn sample_report() -> BatchReport {
        let ok = ConversionRequest::new("in/a.png", "out/a.webp", ConversionKind::WebP);
        let bad = ConversionRequest::new("in/b.png", "out/b.webp", ConversionKind::WebP);
        vec![
            ConversionOutcome::succeeded(ok),
            ConversionOutcome::failed(bad, &ConverterError::DecodeFailure("bad header".into())),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_counters_follow_outcomes() {
        let report = sample_report();
        assert_eq!(report.total, report.outcomes.len());
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_complete_success());
        assert_eq!(report.failed_requests()[0].input_path, Path::new("in/b.png"));
    }

    #[test]
    fn test_save_json_and_csv() {
        let dir = TempDir::new().unwrap();
        let report = sample_report();

        let json_path = dir.path().join("report.json");
        report.save(&json_path).unwrap();
        let parsed: BatchReport =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed.total, 2);
        assert_eq!(parsed.succeeded, 1);

        let csv_path = dir.path().join("report.csv");
        report.save(&csv_path).unwrap();
        let text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(text.starts_with("input,output,type,success,error_kind,error"));
        assert!(text.contains("decode_failure"));
    }
}
