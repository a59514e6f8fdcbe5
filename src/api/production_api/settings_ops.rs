use super::*;

use crate::config::SettingsViolation;

impl ProductionApi {
    // ==========================================
    // 设置
    // ==========================================

    /// 保存设置（整体替换）
    ///
    /// # 返回
    /// - Err(InvalidInput): 校验失败（信息为全部违规，分号分隔），状态不变
    /// - Err(PersistenceError): 写入失败，内存已回滚
    pub fn save_settings(&mut self, settings: Settings) -> ApiResult<()> {
        let violations = settings.validate();
        if !violations.is_empty() {
            return Err(ApiError::InvalidInput(join_violations(&violations)));
        }

        let previous = self.snapshot();
        self.settings = settings;
        self.commit(previous, &[StorageKey::Settings])?;

        info!(
            work_hours = self.settings.work_hours_per_day,
            lunch_break_minutes = self.settings.lunch_break_minutes,
            "设置已保存"
        );
        Ok(())
    }

    /// 恢复默认设置（仅内存，需再调用 save_settings 持久化）
    pub fn reset_settings(&mut self) -> &Settings {
        self.settings = Settings::default();
        info!("已恢复默认设置（未保存）");
        &self.settings
    }
}

pub(super) fn join_violations(violations: &[SettingsViolation]) -> String {
    violations
        .iter()
        .map(SettingsViolation::message)
        .collect::<Vec<_>>()
        .join("; ")
}
