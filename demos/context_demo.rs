use tokio::time::{sleep, Duration};

use tracing_log_facade::{default_logger, from_context, task, with_logger, Context};

async fn handle(ctx: Context, request_id: u32) {
    let logger = from_context(&ctx);
    logger.info("handling request", &[("request_id", request_id.into())]);
    sleep(Duration::from_millis(10)).await;
    logger
        .v(1)
        .info("request done", &[("took", Duration::from_millis(10).into())]);
}

#[tokio::main]
async fn main() {
    // Try with LOG_MODE=development and LOG_VERBOSITY=0..2.
    let root = Context::background();
    from_context(&root).info("service starting", &[]);

    for request_id in 0..3 {
        let logger = default_logger()
            .with_name("http")
            .with_values(&[("request_id", request_id.into())]);
        handle(with_logger(&root, logger), request_id).await;
    }

    let worker = default_logger().with_name("worker");
    task::scope(worker, async {
        task::current().info("inside task scope", &[]);
    })
    .await;

    let err = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
    default_logger().error(&err, "upstream failed", &[("upstream", "db".into())]);
    default_logger().flush();
}
