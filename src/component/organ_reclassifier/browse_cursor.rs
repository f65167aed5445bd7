//! 瀏覽游標
//!
//! 在掃描結果上前後移動，到頭尾即停止（不循環）。
//! 任何會改動磁碟的操作之後游標會失效，必須重新掃描才能繼續瀏覽。

use crate::error::CursorError;
use crate::tools::{DataPointEntry, RootKind};

#[derive(Debug, Default)]
pub struct BrowseCursor {
    entries: Vec<DataPointEntry>,
    index: usize,
    stale: bool,
}

impl BrowseCursor {
    #[must_use]
    pub fn new(entries: Vec<DataPointEntry>) -> Self {
        Self {
            entries,
            index: 0,
            stale: false,
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[DataPointEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// 目前的資料點；游標失效或清單為空時為 None
    #[must_use]
    pub fn current(&self) -> Option<&DataPointEntry> {
        if self.stale {
            return None;
        }
        self.entries.get(self.index)
    }

    /// (從 1 開始的位置, 總數)；清單為空時位置為 0
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        if self.entries.is_empty() {
            (0, 0)
        } else {
            (self.index + 1, self.entries.len())
        }
    }

    pub fn forward(&mut self) -> Result<Option<&DataPointEntry>, CursorError> {
        self.ensure_fresh()?;
        if self.index + 1 < self.entries.len() {
            self.index += 1;
        }
        Ok(self.entries.get(self.index))
    }

    pub fn back(&mut self) -> Result<Option<&DataPointEntry>, CursorError> {
        self.ensure_fresh()?;
        self.index = self.index.saturating_sub(1);
        Ok(self.entries.get(self.index))
    }

    /// 跳到第 `position` 筆（從 1 開始）
    pub fn jump_to_index(&mut self, position: usize) -> Result<&DataPointEntry, CursorError> {
        self.ensure_fresh()?;
        if position == 0 || position > self.entries.len() {
            return Err(CursorError::OutOfRange {
                len: self.entries.len(),
            });
        }
        self.index = position - 1;
        Ok(&self.entries[self.index])
    }

    pub fn jump_to_patient_id(&mut self, patient_id: &str) -> Result<&DataPointEntry, CursorError> {
        self.jump_to_first(patient_id, |e| e.patient_id() == patient_id)
    }

    pub fn jump_to_guid(&mut self, guid: &str) -> Result<&DataPointEntry, CursorError> {
        self.jump_to_first(guid, |e| !e.guid().is_empty() && e.guid() == guid)
    }

    /// 跳到某個器官的第一筆資料點
    pub fn jump_to_organ(
        &mut self,
        kind: RootKind,
        organ: &str,
    ) -> Result<&DataPointEntry, CursorError> {
        let label = format!("{kind}/{organ}");
        self.jump_to_first(&label, |e| e.root_kind == kind && e.organ == organ)
    }

    /// 標記為失效；清單已與磁碟不一致
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// 換上新的掃描結果，位置保留並限制在新清單範圍內
    pub fn refresh(&mut self, entries: Vec<DataPointEntry>) {
        self.entries = entries;
        self.index = self.index.min(self.entries.len().saturating_sub(1));
        self.stale = false;
    }

    fn jump_to_first(
        &mut self,
        label: &str,
        predicate: impl Fn(&DataPointEntry) -> bool,
    ) -> Result<&DataPointEntry, CursorError> {
        self.ensure_fresh()?;
        let index = self
            .entries
            .iter()
            .position(predicate)
            .ok_or_else(|| CursorError::NotFound(label.to_string()))?;
        self.index = index;
        Ok(&self.entries[index])
    }

    const fn ensure_fresh(&self) -> Result<(), CursorError> {
        if self.stale {
            Err(CursorError::Stale)
        } else {
            Ok(())
        }
    }
}
