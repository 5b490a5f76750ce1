use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Memory元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryMetadata {
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub data_sizes: HashMap<String, usize>,
    pub total_size: usize,
}

impl Default for MemoryMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryMetadata {
    pub fn new() -> Self {
        Self {
            created_at: Utc::now(),
            last_updated: Utc::now(),
            data_sizes: HashMap::new(),
            total_size: 0,
        }
    }
}

/// 会话内存
///
/// 保存当前编辑会话中各阶段的候选结果，只存在于进程内，不写入草稿存储。
#[derive(Debug)]
pub struct Memory {
    data: HashMap<String, Value>,
    metadata: MemoryMetadata,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            metadata: MemoryMetadata::new(),
        }
    }

    fn full_key(scope: &str, key: &str) -> String {
        format!("{}:{}", scope, key)
    }

    /// 存储数据到指定作用域和键，已有数据会被整体替换
    pub fn store<T>(&mut self, scope: &str, key: &str, data: T) -> Result<()>
    where
        T: Serialize,
    {
        let full_key = Self::full_key(scope, key);
        let serialized = serde_json::to_value(data)?;

        let data_size = serialized.to_string().len();
        if let Some(old_size) = self.metadata.data_sizes.get(&full_key) {
            self.metadata.total_size -= old_size;
        }
        self.metadata.data_sizes.insert(full_key.clone(), data_size);
        self.metadata.total_size += data_size;
        self.metadata.last_updated = Utc::now();

        self.data.insert(full_key, serialized);
        Ok(())
    }

    /// 从指定作用域和键获取数据
    pub fn get<T>(&self, scope: &str, key: &str) -> Option<T>
    where
        T: for<'a> Deserialize<'a>,
    {
        self.data
            .get(&Self::full_key(scope, key))
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// 删除指定数据
    pub fn remove(&mut self, scope: &str, key: &str) -> bool {
        let full_key = Self::full_key(scope, key);
        if let Some(size) = self.metadata.data_sizes.remove(&full_key) {
            self.metadata.total_size -= size;
        }
        self.metadata.last_updated = Utc::now();
        self.data.remove(&full_key).is_some()
    }

    /// 清空整个作用域
    pub fn clear_scope(&mut self, scope: &str) {
        for key in self.list_keys(scope) {
            self.remove(scope, &key);
        }
    }

    /// 列出指定作用域的所有键
    pub fn list_keys(&self, scope: &str) -> Vec<String> {
        let prefix = format!("{}:", scope);
        let mut keys: Vec<String> = self
            .data
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .map(|key| key[prefix.len()..].to_string())
            .collect();
        keys.sort();
        keys
    }

    /// 检查是否存在指定数据
    pub fn has_data(&self, scope: &str, key: &str) -> bool {
        self.data.contains_key(&Self::full_key(scope, key))
    }

    pub fn total_size(&self) -> usize {
        self.metadata.total_size
    }
}
