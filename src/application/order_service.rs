//! Process composition for the order service.
//!
//! Start-up order is fixed: open the store, warm the cache, then start the
//! ingestor and the query endpoint together. A failed warm-up aborts start-up
//! before anything is served. One cancellation token drives shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::adapters::cache::OrderCache;
use crate::adapters::http::OrderHttpServer;
use crate::adapters::sqlite::{initialize_database, PoolConfig, SqliteOrderRepository};
use crate::adapters::stream::LineDelimitedStream;
use crate::domain::errors::DomainResult;
use crate::domain::models::{Config, HttpConfig, IngestorConfig, StreamConfig, StreamSource};
use crate::domain::ports::{MessageStream, OrderRepository};
use crate::services::{IngestorReport, OrderIngestor, WriteThroughWriter};

/// A store paired with a cache that has been warmed from it.
pub struct OrderPipeline<R: OrderRepository> {
    writer: WriteThroughWriter<R>,
}

impl<R: OrderRepository + 'static> OrderPipeline<R> {
    /// Warm a fresh cache from `repository`.
    ///
    /// Fails with `WarmUpFailure` if the store cannot be enumerated.
    pub async fn start(repository: Arc<R>) -> DomainResult<Self> {
        let cache = Arc::new(OrderCache::new());
        cache.warm_up(repository.as_ref()).await?;
        Ok(Self {
            writer: WriteThroughWriter::new(repository, cache),
        })
    }

    pub fn cache(&self) -> &Arc<OrderCache> {
        self.writer.cache()
    }

    pub fn repository(&self) -> &Arc<R> {
        self.writer.repository()
    }

    /// Run the ingestor on its own task until `cancel` fires or the stream closes.
    pub fn spawn_ingestor(
        &self,
        stream: Box<dyn MessageStream>,
        cancel: CancellationToken,
        config: &IngestorConfig,
    ) -> JoinHandle<IngestorReport> {
        let ingestor = OrderIngestor::new(stream, self.writer.clone(), cancel, config);
        tokio::spawn(ingestor.run())
    }

    pub fn http_server(&self, config: HttpConfig) -> OrderHttpServer {
        OrderHttpServer::new(self.cache().clone(), config)
    }

    /// Serve queries on `listener` and ingest from `stream` until `shutdown`
    /// fires, then wait for the ingestor to finish its in-flight message.
    pub async fn serve(
        &self,
        listener: TcpListener,
        stream: Box<dyn MessageStream>,
        config: &Config,
        shutdown: CancellationToken,
    ) -> Result<IngestorReport> {
        let ingest_token = shutdown.child_token();
        let ingestor = self.spawn_ingestor(stream, ingest_token.clone(), &config.ingestor);

        let http_result = self
            .http_server(config.http.clone())
            .serve_listener(listener, shutdown.clone().cancelled_owned())
            .await;
        if http_result.is_err() {
            shutdown.cancel();
        }

        ingest_token.cancel();
        let report = ingestor.await.context("Ingestor task failed")?;
        http_result.context("Query server failed")?;
        Ok(report)
    }
}

/// Run the service until `shutdown` is cancelled.
pub async fn run(config: Config, shutdown: CancellationToken) -> Result<()> {
    tracing::info!(
        database = %config.database.url,
        source = config.stream.source.as_str(),
        topic = %config.stream.topic,
        bind = %config.http.bind,
        "starting order service"
    );

    let pool = initialize_database(&config.database.url, Some(PoolConfig::from(&config.database)))
        .await
        .context("Failed to open order store")?;
    let repository = Arc::new(SqliteOrderRepository::new(pool.clone()));

    let pipeline = OrderPipeline::start(repository)
        .await
        .context("Failed to warm order cache")?;

    let stream = build_stream(&config.stream)?;
    let addr = pipeline.http_server(config.http.clone()).socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let result = pipeline.serve(listener, stream, &config, shutdown).await;

    pool.close().await;
    let report = result?;
    tracing::info!(
        persisted = report.persisted,
        duplicates = report.duplicates,
        cached = pipeline.cache().len().await,
        "order service stopped"
    );
    Ok(())
}

/// Open the configured inbound stream.
pub fn build_stream(config: &StreamConfig) -> Result<Box<dyn MessageStream>> {
    match config.source {
        StreamSource::Stdin => {
            tracing::info!("reading orders from stdin");
            Ok(Box::new(LineDelimitedStream::stdin()))
        }
        StreamSource::Kafka => kafka_stream(config),
    }
}

#[cfg(feature = "kafka")]
fn kafka_stream(config: &StreamConfig) -> Result<Box<dyn MessageStream>> {
    let stream = crate::adapters::stream::KafkaOrderStream::connect(config)
        .context("Failed to connect to Kafka")?;
    Ok(Box::new(stream))
}

#[cfg(not(feature = "kafka"))]
fn kafka_stream(_config: &StreamConfig) -> Result<Box<dyn MessageStream>> {
    anyhow::bail!("stream source `kafka` requires building with the `kafka` feature; use `stdin` instead")
}
