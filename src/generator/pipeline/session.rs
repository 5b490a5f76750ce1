use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::error::{PipelineError, PipelineResult};
use crate::generator::context::GeneratorContext;
use crate::generator::outlet::{PersistenceGateway, PostId};
use crate::generator::pipeline::controller::{GenerationApplied, PipelineController};
use crate::generator::pipeline::stage::{GenerationTarget, Stage};

/// 一个编辑会话：控制器加上外部服务
///
/// 生成期间不持有控制器的锁，用户可以在等待时继续导航，过期的结果在回写时被丢弃。
#[derive(Clone)]
pub struct PipelineSession {
    controller: Arc<Mutex<PipelineController>>,
    context: GeneratorContext,
}

impl PipelineSession {
    pub fn new(controller: PipelineController, context: GeneratorContext) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            context,
        }
    }

    pub fn context(&self) -> &GeneratorContext {
        &self.context
    }

    /// 获取控制器，用于导航、选择等同步操作
    pub async fn controller(&self) -> MutexGuard<'_, PipelineController> {
        self.controller.lock().await
    }

    /// 为指定目标执行一次生成
    pub async fn run(&self, target: GenerationTarget) -> PipelineResult<GenerationApplied> {
        let (ticket, request) = self.controller.lock().await.begin_generation(target)?;

        let result = request.execute(&self.context).await;

        self.controller
            .lock()
            .await
            .complete_generation(ticket, result)
    }

    /// 重新生成当前阶段的候选
    pub async fn regenerate(&self) -> PipelineResult<GenerationApplied> {
        let stage = self.controller.lock().await.stage();
        self.run(GenerationTarget::stage(stage)).await
    }

    /// 生成（或重新生成）单个章节的正文
    pub async fn generate_section(&self, index: usize) -> PipelineResult<GenerationApplied> {
        self.run(GenerationTarget::section(index)).await
    }

    /// 依次生成所有尚无正文的章节，单个章节失败不影响其他章节
    pub async fn generate_all_sections(&self) -> Vec<(usize, PipelineResult<GenerationApplied>)> {
        let pending = {
            let controller = self.controller.lock().await;
            if controller.stage() != Stage::Content {
                return Vec::new();
            }
            controller.draft().incomplete_sections()
        };

        let mut results = Vec::with_capacity(pending.len());
        for index in pending {
            let result = self.generate_section(index).await;
            if let Err(e) = &result {
                tracing::warn!(section = index + 1, error = %e, "章节生成失败");
            }
            results.push((index, result));
        }
        results
    }

    /// 发布；失败时草稿保持不变
    pub async fn publish(
        &self,
        gateway: &dyn PersistenceGateway,
        category_id: &str,
        destination_id: &str,
    ) -> PipelineResult<PostId> {
        let request = self
            .controller
            .lock()
            .await
            .prepare_publication(category_id, destination_id)?;

        match gateway.publish(&request).await {
            Ok(post_id) => {
                self.controller
                    .lock()
                    .await
                    .finish_publication(&post_id)?;
                Ok(post_id)
            }
            Err(failure) => {
                tracing::warn!(error = %failure, slug = %request.slug, "发布失败，草稿已保留");
                Err(PipelineError::Persistence(failure))
            }
        }
    }
}
