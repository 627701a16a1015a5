//! 去重诊断收集器
//!
//! 同一 (诊断码, 文件, 位置) 只保留第一次报告的诊断。收集器可以在多个检查器
//! 线程间共享，内部使用 `parking_lot::Mutex` 保证去重判断与插入是原子的。

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::trace;

use super::{Diagnostic, DiagnosticKey, Severity};

#[derive(Debug, Default)]
pub struct DiagnosticSink {
    entries: Mutex<IndexMap<DiagnosticKey, Diagnostic>>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 报告诊断；已有相同键时丢弃并返回 `false`
    pub fn report(
        &self,
        diagnostic: Diagnostic,
    ) -> bool {
        let key = diagnostic.key();
        let mut entries = self.entries.lock();
        if entries.contains_key(&key) {
            trace!(code = key.code, "duplicate diagnostic dropped");
            return false;
        }
        entries.insert(key, diagnostic);
        true
    }

    /// 批量报告，返回实际新增的数量
    pub fn extend(
        &self,
        diagnostics: impl IntoIterator<Item = Diagnostic>,
    ) -> usize {
        diagnostics
            .into_iter()
            .map(|d| self.report(d))
            .filter(|accepted| *accepted)
            .count()
    }

    pub fn contains(
        &self,
        key: &DiagnosticKey,
    ) -> bool {
        self.entries.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// 指定严重级别的诊断数量
    pub fn count(
        &self,
        severity: Severity,
    ) -> usize {
        self.entries
            .lock()
            .values()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// 当前内容的快照，按报告顺序
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries.lock().values().cloned().collect()
    }

    /// 取出全部诊断，按 (文件, 位置, 诊断码) 排序
    ///
    /// 并行检查时报告顺序不确定，排序后输出稳定。
    pub fn finish(self) -> Vec<Diagnostic> {
        let mut entries = self.entries.into_inner();
        entries.sort_keys();
        entries.into_values().collect()
    }
}
