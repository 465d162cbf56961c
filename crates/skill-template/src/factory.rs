//! 模板工厂：串起加载器与渲染器。

use std::sync::Arc;

use tracing::debug;

use crate::TemplateData;
use crate::error::TemplateError;
use crate::loader::TemplateLoader;
use crate::renderer::TemplateRenderer;

/// 由模板名、数据与输入生成输出。
pub trait TemplateFactory<I, O>: Send + Sync {
    fn process_template(
        &self,
        template_name: &str,
        data: &TemplateData,
        input: &I,
    ) -> Result<O, TemplateError>;
}

/// 按顺序尝试加载器，首个找到模板的加载器胜出，随后交给渲染器。
///
/// 构建时至少需要一个加载器和一个渲染器，缺失即返回错误，避免在请求期才暴露装配问题。
pub struct BaseTemplateFactory<I, O> {
    loaders: Vec<Arc<dyn TemplateLoader<I>>>,
    renderer: Arc<dyn TemplateRenderer<O>>,
}

impl<I, O> BaseTemplateFactory<I, O> {
    pub fn builder() -> BaseTemplateFactoryBuilder<I, O> {
        BaseTemplateFactoryBuilder {
            loaders: Vec::new(),
            renderer: None,
        }
    }
}

impl<I, O> TemplateFactory<I, O> for BaseTemplateFactory<I, O> {
    fn process_template(
        &self,
        template_name: &str,
        data: &TemplateData,
        input: &I,
    ) -> Result<O, TemplateError> {
        for loader in &self.loaders {
            if let Some(template) = loader.load(input, template_name)? {
                debug!(
                    template = template_name,
                    identifier = template.identifier(),
                    "rendering template"
                );
                return self.renderer.render(&template, data);
            }
        }
        Err(TemplateError::NotFound {
            name: template_name.to_owned(),
        })
    }
}

pub struct BaseTemplateFactoryBuilder<I, O> {
    loaders: Vec<Arc<dyn TemplateLoader<I>>>,
    renderer: Option<Arc<dyn TemplateRenderer<O>>>,
}

impl<I, O> BaseTemplateFactoryBuilder<I, O> {
    pub fn with_loader(mut self, loader: impl TemplateLoader<I> + 'static) -> Self {
        self.loaders.push(Arc::new(loader));
        self
    }

    pub fn with_renderer(mut self, renderer: impl TemplateRenderer<O> + 'static) -> Self {
        self.renderer = Some(Arc::new(renderer));
        self
    }

    pub fn build(self) -> Result<BaseTemplateFactory<I, O>, TemplateError> {
        if self.loaders.is_empty() {
            return Err(TemplateError::NoLoaders);
        }
        let renderer = self.renderer.ok_or(TemplateError::NoRenderer)?;
        Ok(BaseTemplateFactory {
            loaders: self.loaders,
            renderer,
        })
    }
}
