//! 分发引擎的端到端行为：解析顺序、拦截器顺序、异常恢复与并发共享。

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use skill_runtime::{
    DefaultExceptionMapper, DefaultRequestMapper, Dispatcher, FunctionalExceptionHandler,
    FunctionalHandler, HandlerShape, RequestHandler, RequestHandlerChain, SkillError, codes,
};

/// 测试输入：记录流经的各个环节。
#[derive(Debug, Default)]
struct Event {
    kind: &'static str,
    trail: Vec<String>,
}

impl Event {
    fn of(kind: &'static str) -> Self {
        Self {
            kind,
            trail: Vec::new(),
        }
    }
}

type Output = String;

/// 只认领指定 `kind` 的类型化处理器，并统计谓词调用次数。
struct KindHandler {
    kind: &'static str,
    predicate_calls: Arc<AtomicUsize>,
}

impl KindHandler {
    fn new(kind: &'static str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                kind,
                predicate_calls: Arc::clone(&calls),
            },
            calls,
        )
    }
}

impl RequestHandler<Event, Output> for KindHandler {
    fn can_handle(&self, input: &mut Event) -> Result<bool, SkillError> {
        self.predicate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(input.kind == self.kind)
    }

    fn handle(&self, input: &mut Event) -> Result<Option<Output>, SkillError> {
        input.trail.push(format!("handler:{}", self.kind));
        Ok(Some(format!("handled {}", self.kind)))
    }

    fn name(&self) -> &str {
        self.kind
    }
}

fn failing_handler(kind: &'static str) -> HandlerShape<Event, Output> {
    HandlerShape::functional(FunctionalHandler::new(
        kind,
        move |input: &mut Event| -> Result<bool, SkillError> { Ok(input.kind == kind) },
        |_: &mut Event| -> Result<Option<Output>, SkillError> {
            Err(SkillError::handler("handler exploded"))
        },
    ))
}

fn recovering(
    name: &'static str,
    reply: &'static str,
) -> FunctionalExceptionHandler<Event, Output> {
    FunctionalExceptionHandler::new(
        name,
        |_: &mut Event, error: &SkillError| error.code() == codes::HANDLER_FAILED,
        move |input: &mut Event, _: &SkillError| -> Result<Option<Output>, SkillError> {
            input.trail.push(format!("exception:{reply}"));
            Ok(Some(reply.to_owned()))
        },
    )
}

fn tagging(tag: &'static str) -> impl Fn(&mut Event) -> Result<(), SkillError> + Send + Sync {
    move |input: &mut Event| -> Result<(), SkillError> {
        input.trail.push(tag.to_owned());
        Ok(())
    }
}

fn suffixing(
    tag: &'static str,
) -> impl Fn(&mut Event, Option<Output>) -> Result<Option<Output>, SkillError> + Send + Sync {
    move |input: &mut Event, output: Option<Output>| -> Result<Option<Output>, SkillError> {
        input.trail.push(tag.to_owned());
        Ok(output.map(|text| format!("{text}+{tag}")))
    }
}

#[test]
fn first_match_wins_and_later_predicates_are_not_evaluated() {
    let (first, first_calls) = KindHandler::new("Other");
    let (second, second_calls) = KindHandler::new("Launch");
    let (third, third_calls) = KindHandler::new("Launch");
    let (fourth, fourth_calls) = KindHandler::new("Launch");

    let dispatcher = Dispatcher::<Event, Output>::builder()
        .with_request_mapper(DefaultRequestMapper::<Event, Output>::default())
        .with_request_mapper(
            DefaultRequestMapper::default()
                .with_chain(RequestHandlerChain::new(HandlerShape::typed(first)))
                .with_chain(RequestHandlerChain::new(HandlerShape::typed(second))),
        )
        .with_request_mapper(
            DefaultRequestMapper::default()
                .with_chain(RequestHandlerChain::new(HandlerShape::typed(third)))
                .with_chain(RequestHandlerChain::new(HandlerShape::typed(fourth))),
        )
        .build()
        .expect("build");

    let mut input = Event::of("Launch");
    let output = dispatcher.dispatch(&mut input).expect("dispatch");

    assert_eq!(output.as_deref(), Some("handled Launch"));
    assert_eq!(first_calls.load(Ordering::SeqCst), 1);
    assert_eq!(second_calls.load(Ordering::SeqCst), 1);
    assert_eq!(third_calls.load(Ordering::SeqCst), 0, "命中之后不应继续求值");
    assert_eq!(fourth_calls.load(Ordering::SeqCst), 0, "命中之后不应继续求值");
}

#[test]
fn no_match_returns_none_and_skips_response_interceptors() {
    let (handler, _) = KindHandler::new("Launch");
    let dispatcher = Dispatcher::<Event, Output>::builder()
        .with_request_mapper(
            DefaultRequestMapper::default()
                .with_chain(RequestHandlerChain::new(HandlerShape::typed(handler))),
        )
        .with_request_interceptor(tagging("global-request"))
        .with_response_interceptor(suffixing("global-response"))
        .build()
        .expect("build");

    let mut input = Event::of("SessionEnded");
    let output = dispatcher.dispatch(&mut input).expect("未命中不是错误");

    assert!(output.is_none());
    assert_eq!(input.trail, vec!["global-request".to_owned()]);
}

#[test]
fn interceptors_run_in_documented_order() {
    let (handler, _) = KindHandler::new("Launch");
    let chain = RequestHandlerChain::builder(HandlerShape::typed(handler))
        .with_request_interceptor(tagging("chain-request"))
        .with_response_interceptor(suffixing("chain-response"))
        .build();
    let dispatcher = Dispatcher::<Event, Output>::builder()
        .with_request_mapper(DefaultRequestMapper::default().with_chain(chain))
        .with_request_interceptor(tagging("global-request-1"))
        .with_request_interceptor(tagging("global-request-2"))
        .with_response_interceptor(suffixing("global-response"))
        .build()
        .expect("build");

    let mut input = Event::of("Launch");
    let output = dispatcher.dispatch(&mut input).expect("dispatch");

    assert_eq!(
        output.as_deref(),
        Some("handled Launch+chain-response+global-response")
    );
    assert_eq!(
        input.trail,
        vec![
            "global-request-1",
            "global-request-2",
            "chain-request",
            "handler:Launch",
            "chain-response",
            "global-response",
        ]
    );
}

#[test]
fn unclaimed_handler_error_is_returned_unchanged() {
    let dispatcher = Dispatcher::<Event, Output>::builder()
        .with_request_mapper(
            DefaultRequestMapper::default()
                .with_chain(RequestHandlerChain::new(failing_handler("Launch"))),
        )
        .with_exception_mapper(DefaultExceptionMapper::<Event, Output>::default())
        .build()
        .expect("build");

    let err = dispatcher
        .dispatch(&mut Event::of("Launch"))
        .expect_err("无异常处理器认领时应返回错误");
    assert_eq!(err.code(), codes::HANDLER_FAILED);
    assert_eq!(err.message(), "handler exploded", "调用方应拿到原始错误");
}

#[test]
fn chain_local_exception_handler_takes_precedence() {
    let chain = RequestHandlerChain::builder(failing_handler("Launch"))
        .with_exception_handler(recovering("local", "local"))
        .build();
    let dispatcher = Dispatcher::<Event, Output>::builder()
        .with_request_mapper(DefaultRequestMapper::default().with_chain(chain))
        .with_exception_handler(recovering("global", "global"))
        .with_response_interceptor(suffixing("global-response"))
        .build()
        .expect("build");

    let mut input = Event::of("Launch");
    let output = dispatcher.dispatch(&mut input).expect("应被链上异常处理器认领");

    assert_eq!(output.as_deref(), Some("local+global-response"));
    assert_eq!(input.trail, vec!["exception:local", "global-response"]);
}

#[test]
fn global_exception_handler_covers_interceptor_failures() {
    let (handler, handler_calls) = KindHandler::new("Launch");
    let dispatcher = Dispatcher::<Event, Output>::builder()
        .with_request_mapper(
            DefaultRequestMapper::default()
                .with_chain(RequestHandlerChain::new(HandlerShape::typed(handler))),
        )
        .with_request_interceptor(|_: &mut Event| -> Result<(), SkillError> {
            Err(SkillError::handler("interceptor refused"))
        })
        .with_exception_handler(recovering("global", "fallback"))
        .build()
        .expect("build");

    let mut input = Event::of("Launch");
    let output = dispatcher.dispatch(&mut input).expect("拦截器失败应被全局处理器兜底");

    assert_eq!(output.as_deref(), Some("fallback"));
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0, "拦截器失败时不应进入解析");
}

#[test]
fn exception_handler_failure_is_not_re_resolved() {
    let second_calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&second_calls);
    let dispatcher = Dispatcher::<Event, Output>::builder()
        .with_request_mapper(
            DefaultRequestMapper::default()
                .with_chain(RequestHandlerChain::new(failing_handler("Launch"))),
        )
        .with_exception_handler(FunctionalExceptionHandler::new(
            "broken",
            |_: &mut Event, error: &SkillError| error.code() == codes::HANDLER_FAILED,
            |_: &mut Event, _: &SkillError| -> Result<Option<Output>, SkillError> {
                Err(SkillError::new(codes::TEMPLATE_NOT_FOUND, "fallback template missing"))
            },
        ))
        .with_exception_handler(FunctionalExceptionHandler::new(
            "catch-all",
            move |_: &mut Event, _: &SkillError| {
                counter.fetch_add(1, Ordering::SeqCst);
                true
            },
            |_: &mut Event, _: &SkillError| -> Result<Option<Output>, SkillError> {
                Ok(Some("should not happen".to_owned()))
            },
        ))
        .build()
        .expect("build");

    let err = dispatcher
        .dispatch(&mut Event::of("Launch"))
        .expect_err("异常处理器失败对本次分发是致命的");
    assert_eq!(err.code(), codes::TEMPLATE_NOT_FOUND);
    assert_eq!(second_calls.load(Ordering::SeqCst), 0, "不应再次进入异常解析");
}

#[test]
fn shared_dispatcher_serves_concurrent_inputs() {
    let (launch, _) = KindHandler::new("Launch");
    let (help, _) = KindHandler::new("Help");
    let dispatcher = Arc::new(
        Dispatcher::<Event, Output>::builder()
            .with_request_mapper(
                DefaultRequestMapper::default()
                    .with_chain(RequestHandlerChain::new(HandlerShape::typed(launch)))
                    .with_chain(RequestHandlerChain::new(HandlerShape::typed(help))),
            )
            .build()
            .expect("build"),
    );
    let outputs = Arc::new(Mutex::new(Vec::new()));

    std::thread::scope(|scope| {
        for kind in ["Launch", "Help", "Launch", "Help"] {
            let dispatcher = Arc::clone(&dispatcher);
            let outputs = Arc::clone(&outputs);
            scope.spawn(move || {
                let output = dispatcher.dispatch(&mut Event::of(kind)).expect("dispatch");
                outputs.lock().push(output.unwrap_or_default());
            });
        }
    });

    let mut outputs = outputs.lock().clone();
    outputs.sort();
    assert_eq!(
        outputs,
        vec!["handled Help", "handled Help", "handled Launch", "handled Launch"]
    );
}
