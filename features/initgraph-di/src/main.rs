use std::{error::Error, sync::Arc};

use initgraph_di::{Closer, Container, DynError, InitPlan};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut container = Container::new();
    container
        .register::<SharedGreeter, _>(new_greeter)?
        .register(new_sentence)?
        .register(|| MyMultiplier(2))?
        .register_closeable::<MyService, _>(my_service_provider)?
        .register(|| MyInt(21))?;

    container.resolve()?;
    println!("{}", InitPlan::of(&container)?);

    container.build()?;
    println!("{:?}", container);

    let service = container.get::<MyService>()?;
    println!("{}", service.greetings());

    for error in futures::executor::block_on(container.close().errors()) {
        tracing::warn!("{error}");
    }

    Ok(())
}

struct MyInt(i64);
struct MyMultiplier(i64);
struct MySentence(String);

fn new_sentence(number: Arc<MyInt>, mult: Arc<MyMultiplier>) -> MySentence {
    MySentence(format!("hello world {}!", number.0 * mult.0))
}

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}
type SharedGreeter = Box<dyn Greeter>;

struct MyGreeter {
    sentence: Arc<MySentence>,
}
impl Greeter for MyGreeter {
    fn greet(&self) -> String {
        self.sentence.0.clone()
    }
}

fn new_greeter(sentence: Arc<MySentence>) -> Result<SharedGreeter, DynError> {
    Ok(Box::new(MyGreeter { sentence }))
}

struct MyService {
    greeter: Arc<SharedGreeter>,
    mult: Arc<MyMultiplier>,
}
impl MyService {
    fn greetings(&self) -> String {
        format!("sentence: {}, mult: {}", self.greeter.greet(), self.mult.0)
    }
}
impl Closer for MyService {
    type Error = DynError;

    async fn close(&self) -> Result<(), DynError> {
        Err("MyService closed".into())
    }
}

fn my_service_provider(
    greeter: Arc<SharedGreeter>,
    mult: Arc<MyMultiplier>,
) -> Result<MyService, DynError> {
    Ok(MyService { greeter, mult })
}
