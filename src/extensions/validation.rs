use crate::aspect::{AspectHandler, Next, Outcome};
use crate::context::{InvocationContext, PassMode};
use crate::error::{Result, WeaveError};
use async_trait::async_trait;

/// Parameter constraint checked by [`ValidateParametersHandler`]
pub const NOT_NULL: &str = "not_null";

/// Rejects the call before the method runs when a required argument is `None`
///
/// Required arguments are the parameters carrying the [`NOT_NULL`] constraint
/// plus any names listed in `not_null`.
#[derive(crate::DeriveAspect, Debug, Clone, Default)]
#[aspect(default_order = -1000)]
pub struct ValidateParameters {
    pub order: Option<i32>,
    pub not_null: Vec<&'static str>,
}

pub struct ValidateParametersHandler;

#[async_trait]
impl AspectHandler<ValidateParameters> for ValidateParametersHandler {
    async fn intercept<'a>(
        &self,
        attribute: &ValidateParameters,
        context: InvocationContext<'a>,
        next: Next<'a>,
    ) -> Result<Outcome> {
        let method = context.method();
        let required = method
            .parameters()
            .iter()
            // out parameters hold no value on entry
            .filter(|parameter| parameter.mode != PassMode::Out && parameter.has_constraint(NOT_NULL))
            .map(|parameter| parameter.name)
            .chain(attribute.not_null.iter().copied());

        for name in required {
            let argument = context
                .arguments()
                .get(name)
                .ok_or_else(|| WeaveError::ArgumentMissing {
                    name: name.to_string(),
                })?;
            if argument.is_none() {
                tracing::debug!(method = method.name(), parameter = name, "null argument rejected");
                return Err(WeaveError::Validation {
                    method: method.name().to_string(),
                    message: format!("parameter '{name}' cannot be null"),
                });
            }
        }

        next.run(context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Aspect;
    use crate::context::{Arguments, MethodHandle, ParameterInfo};
    use crate::di::Container;
    use crate::pipeline::Pipeline;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static PARAMETERS: [ParameterInfo; 2] = [
        ParameterInfo::new("customer", "Option<String>", PassMode::Value).with_constraints(&[NOT_NULL]),
        ParameterInfo::new("note", "Option<String>", PassMode::Value),
    ];
    static METHOD: MethodHandle = MethodHandle::new("tests::Orders", "create", &PARAMETERS, true);

    fn arguments(customer: Option<&str>, note: Option<&str>) -> Arguments {
        Arguments::builder()
            .optional("customer", customer.map(String::from))
            .optional("note", note.map(String::from))
            .build()
    }

    async fn invoke(attribute: &ValidateParameters, arguments: Arguments) -> (Result<Outcome>, usize) {
        let mut provider = Container::new();
        provider.register_handler::<ValidateParameters, _>(ValidateParametersHandler);
        let calls = AtomicUsize::new(0);

        let pipeline = Pipeline::new(|_context| {
            calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Ok(Outcome::void()) })
        })
        .wrap(&provider, attribute)
        .unwrap();
        let context = InvocationContext::new(None, &provider, &METHOD, arguments);
        let result = pipeline.run(context).await;
        (result, calls.load(Ordering::SeqCst))
    }

    #[test]
    fn test_default_order() {
        assert_eq!(ValidateParameters::default().order(), -1000);
    }

    #[tokio::test]
    async fn test_constrained_none_short_circuits() {
        let (result, calls) = invoke(&ValidateParameters::default(), arguments(None, Some("gift"))).await;
        let err = result.unwrap_err();
        assert!(err.to_string().contains("customer"));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_unconstrained_none_is_allowed() {
        let (result, calls) = invoke(&ValidateParameters::default(), arguments(Some("ada"), None)).await;
        assert!(result.unwrap().is_void());
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_listed_names_are_required() {
        let attribute = ValidateParameters {
            not_null: vec!["note"],
            ..Default::default()
        };
        let (result, calls) = invoke(&attribute, arguments(Some("ada"), None)).await;
        assert!(matches!(result, Err(WeaveError::Validation { .. })));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_listed_name_without_argument_is_missing() {
        let attribute = ValidateParameters {
            not_null: vec!["coupon"],
            ..Default::default()
        };
        let (result, calls) = invoke(&attribute, arguments(Some("ada"), None)).await;
        assert!(matches!(result, Err(WeaveError::ArgumentMissing { name }) if name == "coupon"));
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_none_behind_reference_is_rejected() {
        // `customer: &Option<String>` is snapshotted from its referent
        let customer: Option<String> = None;
        let borrowed = &customer;
        let arguments = Arguments::builder()
            .optional("customer", Clone::clone(&*borrowed))
            .optional("note", None::<String>)
            .build();
        let (result, calls) = invoke(&ValidateParameters::default(), arguments).await;
        assert!(matches!(result, Err(WeaveError::Validation { .. })));
        assert_eq!(calls, 0);
    }
}
