//! Interceptors written in the exact shape the generator emits.

use aspectweave::extensions::{LogExecution, Retry, ValidateParameters};
use aspectweave::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

type Journal = Arc<Mutex<Vec<String>>>;

struct Recorder<A> {
    label: &'static str,
    journal: Journal,
    inner: Arc<dyn AspectHandler<A>>,
}

#[async_trait]
impl<A: Aspect> AspectHandler<A> for Recorder<A> {
    async fn intercept<'a>(
        &self,
        attribute: &A,
        context: InvocationContext<'a>,
        next: Next<'a>,
    ) -> aspectweave::Result<Outcome> {
        self.journal.lock().unwrap().push(format!("{}-before", self.label));
        let result = self.inner.intercept(attribute, context, next).await;
        self.journal.lock().unwrap().push(format!("{}-after", self.label));
        result
    }
}

fn recorder<A: Aspect, H: AspectHandler<A>>(label: &'static str, journal: &Journal, inner: H) -> Recorder<A> {
    Recorder {
        label,
        journal: journal.clone(),
        inner: Arc::new(inner),
    }
}

struct Orders {
    services: Container,
    journal: Journal,
    failures: AtomicU32,
}

#[derive(Debug, PartialEq)]
struct OutOfStock;

impl Orders {
    async fn place(&self, sku: Option<String>, quantity: u32) -> u64 {
        self.journal.lock().unwrap().push("body".to_string());
        sku.map_or(0, |sku| sku.len() as u64 * u64::from(quantity))
    }

    fn reserve(&self, quantity: u32, held: &mut u32) -> std::result::Result<u32, OutOfStock> {
        if self.failures.fetch_sub(1, Ordering::SeqCst) > 0 {
            return Err(OutOfStock);
        }
        *held += quantity;
        Ok(*held)
    }
}

#[::aspectweave::intercepts("tests/woven.rs", 1, 1)]
#[inline]
async fn intercept_place_0(this: &Orders, sku: Option<String>, quantity: u32) -> u64 {
    static __PARAMETERS: &[::aspectweave::ParameterInfo] = &[
        ::aspectweave::ParameterInfo::new("sku", "Option<String>", ::aspectweave::PassMode::Value)
            .with_constraints(&["not_null"]),
        ::aspectweave::ParameterInfo::new("quantity", "u32", ::aspectweave::PassMode::Value),
    ];
    static __METHOD: ::aspectweave::MethodSlot = ::aspectweave::MethodSlot::new();
    let __method: &'static ::aspectweave::MethodHandle = __METHOD.get_or_init(|| {
        ::aspectweave::MethodHandle::new("woven::Orders", "place", __PARAMETERS, true)
    });
    static __ASPECT_0: ::aspectweave::AttributeSlot<ValidateParameters> = ::aspectweave::AttributeSlot::new();
    let __aspect_0: &'static ValidateParameters =
        __ASPECT_0.get_or_init(|| <ValidateParameters as ::core::default::Default>::default());
    static __ASPECT_1: ::aspectweave::AttributeSlot<LogExecution> = ::aspectweave::AttributeSlot::new();
    let __aspect_1: &'static LogExecution =
        __ASPECT_1.get_or_init(|| <LogExecution as ::core::default::Default>::default());
    static __ASPECT_2: ::aspectweave::AttributeSlot<Retry> = ::aspectweave::AttributeSlot::new();
    let __aspect_2: &'static Retry = __ASPECT_2.get_or_init(|| Retry {
        max_attempts: 2,
        delay_ms: 0,
        ..::core::default::Default::default()
    });
    let __provider: &dyn ::aspectweave::ServiceProvider = &this.services;
    let __arguments = ::aspectweave::Arguments::builder()
        .optional("sku", ::core::clone::Clone::clone(&sku))
        .value("quantity", ::core::clone::Clone::clone(&quantity))
        .build();
    let __context = ::aspectweave::InvocationContext::new(
        ::core::option::Option::Some(this as &(dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync)),
        __provider,
        __method,
        __arguments,
    );
    let __pipeline = ::aspectweave::Pipeline::new(|_context| {
        let this = this;
        let sku = ::core::clone::Clone::clone(&sku);
        let quantity = ::core::clone::Clone::clone(&quantity);
        ::std::boxed::Box::pin(async move {
            ::core::result::Result::Ok(::aspectweave::Outcome::new(this.place(sku, quantity).await))
        })
    })
    .wrap(__provider, __aspect_2)
    .unwrap_or_else(|__error| __error.raise())
    .wrap(__provider, __aspect_1)
    .unwrap_or_else(|__error| __error.raise())
    .wrap(__provider, __aspect_0)
    .unwrap_or_else(|__error| __error.raise());
    let __result = __pipeline.run(__context).await;
    ::aspectweave::Pipeline::finish::<u64>(__result)
}

#[::aspectweave::intercepts("tests/woven.rs", 2, 1)]
#[inline]
fn intercept_reserve_1(this: &Orders, quantity: u32, held: &mut u32) -> ::core::result::Result<u32, OutOfStock> {
    static __PARAMETERS: &[::aspectweave::ParameterInfo] = &[
        ::aspectweave::ParameterInfo::new("quantity", "u32", ::aspectweave::PassMode::Value),
        ::aspectweave::ParameterInfo::new("held", "u32", ::aspectweave::PassMode::Ref),
    ];
    static __METHOD: ::aspectweave::MethodSlot = ::aspectweave::MethodSlot::new();
    let __method: &'static ::aspectweave::MethodHandle = __METHOD.get_or_init(|| {
        ::aspectweave::MethodHandle::new("woven::Orders", "reserve", __PARAMETERS, false)
    });
    static __ASPECT_0: ::aspectweave::AttributeSlot<Retry> = ::aspectweave::AttributeSlot::new();
    let __aspect_0: &'static Retry = __ASPECT_0.get_or_init(|| Retry {
        delay_ms: 0,
        ..::core::default::Default::default()
    });
    let __provider: &dyn ::aspectweave::ServiceProvider = &this.services;
    let __arguments = ::aspectweave::Arguments::builder()
        .value("quantity", ::core::clone::Clone::clone(&quantity))
        .value("held", ::core::clone::Clone::clone(&*held))
        .build();
    let __context = ::aspectweave::InvocationContext::new(
        ::core::option::Option::Some(this as &(dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync)),
        __provider,
        __method,
        __arguments,
    );
    let held = ::aspectweave::ByRef::new(held);
    let __pipeline = ::aspectweave::Pipeline::new(|_context| {
        let this = this;
        let quantity = ::core::clone::Clone::clone(&quantity);
        let held = &held;
        ::std::boxed::Box::pin(async move {
            let mut held = held.lock().await;
            ::aspectweave::Outcome::from_result(this.reserve(quantity, &mut **held))
        })
    })
    .wrap(__provider, __aspect_0)
    .unwrap_or_else(|__error| __error.raise());
    let __result = __pipeline.run_blocking(__context);
    ::aspectweave::Pipeline::finish_fallible::<u32, OutOfStock>(__result)
}

fn orders(journal: &Journal, failures: u32) -> Orders {
    let services = ContainerBuilder::new()
        .handler::<ValidateParameters, _>(recorder(
            "validate",
            journal,
            aspectweave::extensions::ValidateParametersHandler,
        ))
        .handler::<LogExecution, _>(recorder("log", journal, aspectweave::extensions::LogExecutionHandler))
        .handler::<Retry, _>(recorder("retry", journal, aspectweave::extensions::RetryHandler))
        .build();
    Orders {
        services,
        journal: journal.clone(),
        failures: AtomicU32::new(failures),
    }
}

#[tokio::test]
async fn test_chain_nests_by_ascending_order() -> anyhow::Result<()> {
    let journal: Journal = Default::default();
    let orders = orders(&journal, 0);

    let woven = intercept_place_0(&orders, Some("abc".to_string()), 2).await;
    let unwoven = orders.place(Some("abc".to_string()), 2).await;
    assert_eq!(woven, unwoven);

    let entries = journal.lock().unwrap().clone();
    assert_eq!(
        entries,
        vec![
            "validate-before",
            "log-before",
            "retry-before",
            "body",
            "retry-after",
            "log-after",
            "validate-after",
            "body",
        ]
    );
    Ok(())
}

#[tokio::test]
#[should_panic(expected = "cannot be null")]
async fn test_null_argument_rejected_before_body() {
    let journal: Journal = Default::default();
    let orders = orders(&journal, 0);
    intercept_place_0(&orders, None, 1).await;
}

#[tokio::test]
#[should_panic(expected = "Handler not registered")]
async fn test_unregistered_handler_fails_before_body() {
    let journal: Journal = Default::default();
    let orders = Orders {
        services: Container::new(),
        journal: journal.clone(),
        failures: AtomicU32::new(0),
    };
    intercept_place_0(&orders, Some("abc".to_string()), 1).await;
}

#[test]
fn test_sync_fallible_call_retries_and_writes_through() -> anyhow::Result<()> {
    let journal: Journal = Default::default();
    let orders = orders(&journal, 2);
    let mut held = 10;

    let total = intercept_reserve_1(&orders, 5, &mut held);

    assert_eq!(total, Ok(15));
    assert_eq!(held, 15);
    assert_eq!(orders.failures.load(Ordering::SeqCst), u32::MAX);
    Ok(())
}

#[test]
fn test_fallible_error_reaches_caller_unchanged() {
    let journal: Journal = Default::default();
    let orders = orders(&journal, 5);
    let mut held = 0;

    assert_eq!(intercept_reserve_1(&orders, 1, &mut held), Err(OutOfStock));
    assert_eq!(held, 0);
}
