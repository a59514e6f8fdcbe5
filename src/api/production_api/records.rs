use super::*;

use crate::domain::record::ShiftEntryDraft;
use crate::i18n::t;

impl ProductionApi {
    // ==========================================
    // 记录录入与编辑
    // ==========================================

    /// 新增记录
    ///
    /// # 流程
    /// 1. 校验录入表单（收集全部违规）
    /// 2. 分配 ID 与编号，按当前设置快照构建记录
    /// 3. 追加到集合并持久化（记录 + 计数器）
    ///
    /// # 返回
    /// - Ok(ShiftRecord): 新记录
    /// - Err(ValidationError): 表单校验失败，状态不变
    /// - Err(InternalError): 记录编号已用尽
    /// - Err(PersistenceError): 写入失败，内存已回滚
    pub fn add_record(&mut self, draft: &ShiftEntryDraft) -> ApiResult<ShiftRecord> {
        let entry = self
            .validator
            .parse(draft)
            .map_err(ApiError::from_violations)?;

        let sequence_number = next_record_number(self.record_counter)
            .ok_or_else(|| ApiError::InternalError(t("records.sequence_exhausted")))?;

        let previous = self.snapshot();
        let record = self
            .builder
            .build(
                &entry,
                &self.settings,
                RecordId::generate(),
                sequence_number,
                Utc::now(),
            )
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        self.records.push(record.clone());
        self.record_counter = sequence_number;
        self.commit(previous, &[StorageKey::Records, StorageKey::Counter])?;

        info!(
            id = %record.id,
            sequence_number = record.sequence_number,
            machine_type = %record.machine_type,
            "生产记录已保存"
        );
        Ok(record)
    }

    /// 编辑记录（原位替换）
    ///
    /// 保留 id / 编号 / 创建时间 / 午休快照，其余字段按新表单重算
    ///
    /// # 返回
    /// - Err(NotFound): 记录不存在
    /// - Err(ValidationError): 表单校验失败
    /// - Err(PersistenceError): 写入失败，内存已回滚
    pub fn update_record(
        &mut self,
        id: &RecordId,
        draft: &ShiftEntryDraft,
    ) -> ApiResult<ShiftRecord> {
        let index = self
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("记录(id={})不存在", id)))?;

        let entry = self
            .validator
            .parse(draft)
            .map_err(ApiError::from_violations)?;

        let updated = self
            .builder
            .rebuild(&self.records[index], &entry)
            .map_err(|e| ApiError::InternalError(e.to_string()))?;

        let previous = self.snapshot();
        self.records[index] = updated.clone();
        self.commit(previous, &[StorageKey::Records])?;

        info!(id = %updated.id, "生产记录已更新");
        Ok(updated)
    }
}
