//! Workflow tests exercising the facade crate end to end

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use trellis::prelude::*;
use trellis_testing::{declare, CheckModules};

struct Smtp {
    host: String,
}

trait Notifier: Send + Sync {
    fn channel(&self) -> String;
}

struct EmailNotifier {
    _smtp: Arc<Smtp>,
}

impl Notifier for EmailNotifier {
    fn channel(&self) -> String {
        "email".to_string()
    }
}

struct SignupService {
    notifier: Arc<dyn Notifier>,
}

fn app(constructed: Arc<AtomicUsize>) -> App {
    AppBuilder::new()
        .property("smtp.host", "mail.internal")
        .module(
            Module::new("notifications")
                .provide(
                    single(move |ctx| {
                        constructed.fetch_add(1, Ordering::SeqCst);
                        Ok(Smtp { host: ctx.get_property("smtp.host")? })
                    })
                    .build(),
                )
                .provide(
                    single(|ctx| Ok(EmailNotifier { _smtp: ctx.get::<Smtp>()? }))
                        .bind::<dyn Notifier>(|n| n)
                        .build(),
                ),
        )
        .module(Module::new("signup").single(|ctx| {
            Ok(SignupService { notifier: ctx.get::<dyn Notifier>()? })
        }))
        .build()
        .unwrap()
}

#[test]
fn test_validate_then_run() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let app = app(constructed.clone());

    // validation first: nothing real gets built
    app.check_modules().unwrap();
    assert_eq!(constructed.load(Ordering::SeqCst), 0);

    // then the same container serves the real graph
    let signup = app.container().get::<SignupService>().unwrap();
    assert_eq!(signup.notifier.channel(), "email");
    assert_eq!(constructed.load(Ordering::SeqCst), 1);

    app.close();
}

#[test]
fn test_swap_a_double_then_validate() {
    struct SilentNotifier;
    impl Notifier for SilentNotifier {
        fn channel(&self) -> String {
            "none".to_string()
        }
    }

    let constructed = Arc::new(AtomicUsize::new(0));
    let app = app(constructed);
    let container = app.container();

    container
        .register_definition(
            single(|_| Ok(SilentNotifier))
                .bind::<dyn Notifier>(|n| n)
                .allow_override()
                .build(),
        )
        .unwrap();

    app.check_modules().unwrap();
    let signup = container.get::<SignupService>().unwrap();
    assert_eq!(signup.notifier.channel(), "none");
}

#[test]
fn test_declare_pre_built_settings() {
    let container = Container::new();
    declare(&container, Smtp { host: "localhost".to_string() }).unwrap();
    assert_eq!(container.get::<Smtp>().unwrap().host, "localhost");
}
