//! 拦截器契约与顺序执行辅助函数。
//!
//! 请求拦截器在处理器之前运行，响应拦截器在处理器之后运行并可以替换输出。两类拦截器都可以读写
//! 输入中的属性存储。任一拦截器失败时，后续拦截器不再执行，错误按处理器错误对待。

use std::sync::Arc;

use crate::error::SkillError;

pub trait RequestInterceptor<I>: Send + Sync {
    fn process(&self, input: &mut I) -> Result<(), SkillError>;
}

/// 响应拦截器：接收当前输出（可能为空），返回新的输出。原样返回即为恒等拦截器。
pub trait ResponseInterceptor<I, O>: Send + Sync {
    fn process(&self, input: &mut I, output: Option<O>) -> Result<Option<O>, SkillError>;
}

impl<I, F> RequestInterceptor<I> for F
where
    F: Fn(&mut I) -> Result<(), SkillError> + Send + Sync,
{
    fn process(&self, input: &mut I) -> Result<(), SkillError> {
        self(input)
    }
}

impl<I, O, F> ResponseInterceptor<I, O> for F
where
    F: Fn(&mut I, Option<O>) -> Result<Option<O>, SkillError> + Send + Sync,
{
    fn process(&self, input: &mut I, output: Option<O>) -> Result<Option<O>, SkillError> {
        self(input, output)
    }
}

pub(crate) fn run_request_interceptors<I>(
    interceptors: &[Arc<dyn RequestInterceptor<I>>],
    input: &mut I,
) -> Result<(), SkillError> {
    for interceptor in interceptors {
        interceptor.process(input)?;
    }
    Ok(())
}

pub(crate) fn run_response_interceptors<I, O>(
    interceptors: &[Arc<dyn ResponseInterceptor<I, O>>],
    input: &mut I,
    mut output: Option<O>,
) -> Result<Option<O>, SkillError> {
    for interceptor in interceptors {
        output = interceptor.process(input, output)?;
    }
    Ok(output)
}
