use super::*;

use super::settings_ops::join_violations;
use crate::domain::record::value_as_record_number;
use crate::i18n::{t, t_with_args};
use chrono::{DateTime, NaiveDate, SecondsFormat};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

/// 导出文件格式版本
pub const EXPORT_VERSION: &str = "1.0";

/// 导出文档
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub records: Vec<ShiftRecord>,
    pub settings: Settings,
    pub export_date: String,
    pub version: String,
}

/// 导入结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,          // 实际合并条数
    pub skipped_invalid: usize,   // 缺少必填字段或无法解释
    pub skipped_duplicate: usize, // ID 已存在
    pub total: usize,             // 合并后记录总数
    pub settings_merged: bool,
}

/// 导出文件名：production_records_YYYY-MM-DD.json
pub fn export_file_name(date: NaiveDate) -> String {
    format!("production_records_{}.json", date.format("%Y-%m-%d"))
}

impl ProductionApi {
    // ==========================================
    // 导出
    // ==========================================

    /// 生成导出文档
    ///
    /// # 返回
    /// - Err(InvalidInput): 没有记录可以导出
    pub fn export_document(&self, now: DateTime<Utc>) -> ApiResult<ExportDocument> {
        if self.records.is_empty() {
            return Err(ApiError::InvalidInput(t("export.no_records")));
        }

        Ok(ExportDocument {
            records: self.records.clone(),
            settings: self.settings.clone(),
            export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_VERSION.to_string(),
        })
    }

    /// 导出为 JSON 文本（两空格缩进）
    pub fn export_json(&self, now: DateTime<Utc>) -> ApiResult<String> {
        let document = self.export_document(now)?;
        serde_json::to_string_pretty(&document)
            .map_err(|e| ApiError::InternalError(format!("导出序列化失败: {}", e)))
    }

    /// 导出到文件
    ///
    /// # 返回
    /// - Ok(usize): 导出记录条数
    pub async fn export_to_file<P: AsRef<Path>>(&self, path: P, now: DateTime<Utc>) -> ApiResult<usize> {
        let path = path.as_ref();
        let json = self.export_json(now)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| ApiError::PersistenceError(format!("写入文件失败 {}: {}", path.display(), e)))?;

        info!(path = %path.display(), records = self.records.len(), "记录已导出");
        Ok(self.records.len())
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 读取并导入文件
    ///
    /// 读取失败与解析失败均不合并任何数据
    pub async fn import_file<P: AsRef<Path>>(&mut self, path: P) -> ApiResult<ImportSummary> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            warn!(path = %path.display(), error = %e, "导入文件读取失败");
            let message =
                t_with_args("import.file_read_failed", &[("path", &path.display().to_string())]);
            ApiError::ParseError(format!("{} ({})", message, e))
        })?;

        self.import_json(&text)
    }

    /// 导入 JSON 文档
    ///
    /// # 规则
    /// - 接受导出文档 `{records, settings, ...}` 或记录数组
    /// - 有效记录：非空 id / machineType / productName / startTime / endTime，且 cuts 已定义
    /// - ID 已存在的记录跳过
    /// - 缺少编号的记录分配新编号
    /// - 文档中的 settings 覆盖合并到当前设置
    ///
    /// # 返回
    /// - Err(ParseError): 文档无法解析、设置非法或没有有效记录（不合并任何数据）
    /// - Err(PersistenceError): 写入失败（记录与设置均已回滚）
    pub fn import_json(&mut self, text: &str) -> ApiResult<ImportSummary> {
        let document: Value = serde_json::from_str(text).map_err(|e| {
            warn!(error = %e, "导入文件不是有效的 JSON");
            ApiError::ParseError(format!("{} ({})", t("import.invalid_format"), e))
        })?;

        let (items, settings_patch) = match &document {
            Value::Array(items) => (items, None),
            Value::Object(map) => match map.get("records") {
                Some(Value::Array(items)) => (items, map.get("settings").filter(|v| v.is_object())),
                _ => return Err(ApiError::ParseError(t("import.invalid_format"))),
            },
            _ => return Err(ApiError::ParseError(t("import.invalid_format"))),
        };

        // 1. 设置先行校验（任何记录合并前）
        let merged_settings = match settings_patch {
            Some(patch) => {
                let merged = self
                    .settings
                    .merged_with(patch)
                    .map_err(|e| ApiError::ParseError(format!("设置无法解析: {}", e)))?;
                let violations = merged.validate();
                if !violations.is_empty() {
                    return Err(ApiError::ParseError(join_violations(&violations)));
                }
                Some(merged)
            }
            None => None,
        };

        // 2. 记录筛选与归一化
        let max_file_number = items
            .iter()
            .filter_map(|item| item.get("recordNumber"))
            .filter_map(value_as_record_number)
            .max()
            .unwrap_or(0);
        let mut counter = self.record_counter.max(max_file_number);

        let mut known_ids: HashSet<String> =
            self.records.iter().map(|r| r.id.as_str().to_string()).collect();
        let now = Utc::now();
        let mut summary = ImportSummary::default();
        let mut accepted = Vec::new();

        for (index, item) in items.iter().enumerate() {
            let raw = match serde_json::from_value::<RawShiftRecord>(item.clone()) {
                Ok(raw) if raw.has_required_fields() => raw,
                _ => {
                    summary.skipped_invalid += 1;
                    continue;
                }
            };

            if raw.id_text().is_some_and(|id| known_ids.contains(&id)) {
                summary.skipped_duplicate += 1;
                continue;
            }

            let normalized = self.builder.normalize(&raw, now, || {
                counter = next_record_number(counter)?;
                Some(counter)
            });
            match normalized {
                Ok(record) => {
                    known_ids.insert(record.id.as_str().to_string());
                    accepted.push(record);
                }
                Err(e) => {
                    warn!(index = index, error = %e, "导入记录无法解释，已跳过");
                    summary.skipped_invalid += 1;
                }
            }
        }

        if accepted.is_empty() && summary.skipped_duplicate == 0 {
            return Err(ApiError::ParseError(t("import.no_valid_records")));
        }

        // 3. 合并并持久化
        let previous = self.snapshot();
        summary.imported = accepted.len();
        self.records.extend(accepted);
        self.record_counter = counter;

        let mut keys = vec![StorageKey::Records, StorageKey::Counter];
        if let Some(settings) = merged_settings {
            self.settings = settings;
            summary.settings_merged = true;
            keys.push(StorageKey::Settings);
        }
        self.commit(previous, &keys)?;

        summary.total = self.records.len();
        info!(
            imported = summary.imported,
            skipped_invalid = summary.skipped_invalid,
            skipped_duplicate = summary.skipped_duplicate,
            total = summary.total,
            "记录导入完成"
        );
        Ok(summary)
    }
}
