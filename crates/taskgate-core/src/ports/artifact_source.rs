//! ArtifactSource port - デプロイ対象ファイルの探索
//!
//! # 実装
//! - **FsArtifactSource**: ベースディレクトリ配下の `<group>/` を 1 階層だけ走査
//! - **InMemoryArtifactSource**: テスト用

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::domain::{ArtifactGroup, DeploymentArtifact};

#[derive(Debug, Error)]
pub enum ArtifactSourceError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan artifact group: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Lists the artifacts of one group.
///
/// # 契約
/// - 非再帰（group 直下のファイルのみ）
/// - ファイル以外（ディレクトリ等）はスキップ
/// - ファイル名の辞書順で返す
/// - group が存在しない場合は空（テナント専用フォルダが無いのは正常）
pub trait ArtifactSource: Send + Sync {
    fn list(
        &self,
        group_path: &str,
        group: &ArtifactGroup,
    ) -> Result<Vec<DeploymentArtifact>, ArtifactSourceError>;
}

/// Artifacts on disk under `base/<group_path>/`.
#[derive(Debug, Clone)]
pub struct FsArtifactSource {
    base: PathBuf,
}

impl FsArtifactSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }
}

impl ArtifactSource for FsArtifactSource {
    fn list(
        &self,
        group_path: &str,
        group: &ArtifactGroup,
    ) -> Result<Vec<DeploymentArtifact>, ArtifactSourceError> {
        let dir = self.base.join(group_path);
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "artifact group not present");
            return Ok(Vec::new());
        }

        let mut artifacts = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let content = fs::read(entry.path()).map_err(|source| ArtifactSourceError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let name = entry.file_name().to_string_lossy().into_owned();
            artifacts.push(DeploymentArtifact::new(name, content, group.clone()));
        }
        Ok(artifacts)
    }
}

/// group_path -> (file name -> content)
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtifactSource {
    groups: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
}

impl InMemoryArtifactSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_artifact(
        mut self,
        group_path: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        self.groups
            .entry(group_path.into())
            .or_default()
            .insert(name.into(), content.into());
        self
    }
}

impl ArtifactSource for InMemoryArtifactSource {
    fn list(
        &self,
        group_path: &str,
        group: &ArtifactGroup,
    ) -> Result<Vec<DeploymentArtifact>, ArtifactSourceError> {
        Ok(self
            .groups
            .get(group_path)
            .map(|files| {
                files
                    .iter()
                    .map(|(name, content)| DeploymentArtifact::new(name.clone(), content.clone(), group.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_source_lists_files_sorted_and_non_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let all = dir.path().join("all");
        fs::create_dir_all(all.join("nested")).unwrap();
        fs::write(all.join("b.bpmn"), b"<b/>").unwrap();
        fs::write(all.join("a.bpmn20.xml"), b"<a/>").unwrap();
        fs::write(all.join("nested").join("c.bpmn"), b"<c/>").unwrap();

        let source = FsArtifactSource::new(dir.path());
        let artifacts = source.list("all", &ArtifactGroup::Shared).unwrap();

        let names: Vec<_> = artifacts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["a.bpmn20.xml", "b.bpmn"]);
        assert_eq!(artifacts[0].content, b"<a/>".to_vec());
        assert_eq!(artifacts[0].group, ArtifactGroup::Shared);
    }

    #[test]
    fn fs_source_missing_group_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsArtifactSource::new(dir.path());
        assert!(source.list("nope", &ArtifactGroup::Shared).unwrap().is_empty());
    }

    #[test]
    fn in_memory_source_is_sorted_by_name() {
        let source = InMemoryArtifactSource::new()
            .with_artifact("all", "z.bpmn", "z")
            .with_artifact("all", "a.bpmn", "a");
        let names: Vec<_> = source
            .list("all", &ArtifactGroup::Shared)
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();
        assert_eq!(names, vec!["a.bpmn", "z.bpmn"]);
    }
}
