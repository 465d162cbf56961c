use skill_core::{HandlerInput, Response, SkillError};
use skill_runtime::ResponseInterceptor;
use tracing::trace;

/// 在响应阶段写回持久属性的拦截器。
///
/// # 契约说明（What）
/// - 本次分发未读取也未设置持久层时不产生任何 I/O；
/// - 写回失败原样上抛，由全局异常解析器决定是否兜底；
/// - 输出原样返回。
///
/// 注册为全局响应拦截器时，它也会在异常处理器的输出之后运行。
#[derive(Clone, Copy, Debug, Default)]
pub struct SavePersistentAttributesInterceptor;

impl ResponseInterceptor<HandlerInput, Response> for SavePersistentAttributesInterceptor {
    fn process(
        &self,
        input: &mut HandlerInput,
        output: Option<Response>,
    ) -> Result<Option<Response>, SkillError> {
        if !input.attributes().is_persistent_loaded() {
            trace!(request_id = %input.request().request_id, "persistent attributes untouched");
            return Ok(output);
        }
        input.attributes_mut().save_persistent_attributes()?;
        Ok(output)
    }
}
