use super::*;

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

/// 删除范围
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteScope {
    Record(RecordId),
    Day(NaiveDate),
    Month { year: i32, month: u32 },
    All,
}

/// 删除计划（确认前的待删除列表）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeletePlan {
    /// 范围内没有记录，不需要确认
    NothingToDelete,
    /// 等待确认
    Pending { ids: Vec<RecordId> },
}

impl DeletePlan {
    pub fn pending_count(&self) -> usize {
        match self {
            DeletePlan::NothingToDelete => 0,
            DeletePlan::Pending { ids } => ids.len(),
        }
    }
}

impl ProductionApi {
    // ==========================================
    // 删除（两步：计划 → 执行）
    // ==========================================

    /// 生成删除计划
    ///
    /// # 返回
    /// - Ok(NothingToDelete): 日/月/全部范围内没有记录
    /// - Ok(Pending): 待确认的记录ID列表
    /// - Err(NotFound): 单条删除时记录不存在
    pub fn plan_delete(&self, scope: &DeleteScope) -> ApiResult<DeletePlan> {
        let ids: Vec<RecordId> = match scope {
            DeleteScope::Record(id) => vec![self.get_record(id)?.id.clone()],
            DeleteScope::Day(date) => self
                .records
                .iter()
                .filter(|r| &r.date == date)
                .map(|r| r.id.clone())
                .collect(),
            DeleteScope::Month { year, month } => self
                .records
                .iter()
                .filter(|r| r.in_month(*year, *month))
                .map(|r| r.id.clone())
                .collect(),
            DeleteScope::All => self.records.iter().map(|r| r.id.clone()).collect(),
        };

        if ids.is_empty() {
            return Ok(DeletePlan::NothingToDelete);
        }
        Ok(DeletePlan::Pending { ids })
    }

    /// 执行已确认的删除计划
    ///
    /// 编号计数器不回退（已发放编号不复用）
    ///
    /// # 返回
    /// - Ok(usize): 实际删除条数
    /// - Err(PersistenceError): 写入失败，内存已回滚
    pub fn execute_delete(&mut self, plan: &DeletePlan) -> ApiResult<usize> {
        let DeletePlan::Pending { ids } = plan else {
            return Ok(0);
        };
        let targets: HashSet<&RecordId> = ids.iter().collect();

        let previous = self.snapshot();
        let before = self.records.len();
        self.records.retain(|r| !targets.contains(&r.id));
        let removed = before - self.records.len();
        if removed == 0 {
            return Ok(0);
        }

        self.commit(previous, &[StorageKey::Records])?;
        info!(removed = removed, "生产记录已删除");
        Ok(removed)
    }
}
