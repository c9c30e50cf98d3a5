use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::generator::state::ResearchState;

/// 保存调研报告，返回报告文件路径
pub async fn save(output_dir: &Path, state: &ResearchState) -> Result<PathBuf> {
    let outlet = DiskOutlet::new(output_dir);
    outlet.save(state).await
}

#[allow(async_fn_in_trait)]
pub trait Outlet {
    async fn save(&self, state: &ResearchState) -> Result<PathBuf>;
}

/// 报告文件名：research_report_YYYYMMDD_HHMMSS.md
pub fn report_file_name(timestamp: DateTime<Local>) -> String {
    format!("research_report_{}.md", timestamp.format("%Y%m%d_%H%M%S"))
}

pub struct DiskOutlet {
    output_dir: PathBuf,
}

impl DiskOutlet {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 同一秒内生成多份报告时用 run_id 前缀区分
    fn target_path(&self, state: &ResearchState) -> PathBuf {
        let path = self.output_dir.join(report_file_name(Local::now()));
        if !path.exists() {
            return path;
        }
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let run_id = state.run_id().simple().to_string();
        self.output_dir
            .join(format!("{}_{}.md", stem, &run_id[..8]))
    }
}

impl Outlet for DiskOutlet {
    async fn save(&self, state: &ResearchState) -> Result<PathBuf> {
        let report = state
            .final_report()
            .context("调研尚未生成最终报告，无法保存")?;

        println!("\n🖊️ 报告存储中...");
        fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("无法创建输出目录: {}", self.output_dir.display())
        })?;

        let path = self.target_path(state);
        fs::write(&path, report)
            .with_context(|| format!("无法写入报告文件: {}", path.display()))?;

        println!("💾 已保存报告: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn done_state() -> ResearchState {
        let mut state = ResearchState::new("q").unwrap();
        state.set_sub_questions(Vec::new()).unwrap();
        state.set_search_results(HashMap::new()).unwrap();
        state.set_draft_answer("draft".to_string()).unwrap();
        state
            .set_final_report("# q\n\nbody\n".to_string())
            .unwrap();
        state
    }

    #[test]
    fn test_report_file_name() {
        let timestamp = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            report_file_name(timestamp),
            "research_report_20240309_070501.md"
        );
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("reports").join("nested");

        let path = save(&output_dir, &done_state()).await.unwrap();

        assert!(path.starts_with(&output_dir));
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("research_report_"));
        assert!(name.ends_with(".md"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "# q\n\nbody\n");
    }

    #[tokio::test]
    async fn test_save_twice_does_not_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let outlet = DiskOutlet::new(temp_dir.path());
        let state = done_state();

        let first = outlet.save(&state).await.unwrap();
        let second = outlet.save(&state).await.unwrap();

        assert!(first.exists());
        assert!(second.exists());
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_save_without_report_fails() {
        let temp_dir = TempDir::new().unwrap();
        let state = ResearchState::new("q").unwrap();

        assert!(save(temp_dir.path(), &state).await.is_err());
    }
}
