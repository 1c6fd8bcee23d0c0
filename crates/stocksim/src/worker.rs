//! Background worker for talking to the simulation service without blocking the UI.

use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use stocksim_core::{SimulationRequest, SimulationResult};

use crate::gateway::{GatewayError, HealthStatus, SimulationGateway};

/// How long dropping the worker waits for its thread to exit
const JOIN_GRACE: Duration = Duration::from_millis(200);

/// Request sent to the background worker
#[derive(Debug, Clone)]
pub enum WorkerRequest {
    /// Run one simulation on the service
    Simulate(SimulationRequest),
    /// Probe the service's health endpoint
    HealthCheck,
    /// Graceful shutdown
    Shutdown,
}

/// Response from the background worker
#[derive(Debug)]
pub enum WorkerResponse {
    /// Simulation finished, successfully or not
    Simulation(Result<SimulationResult, GatewayError>),
    Health(HealthStatus),
}

/// Owns the gateway on a dedicated thread; requests are served one at a time
pub struct SimulationWorker {
    request_tx: Sender<WorkerRequest>,
    response_rx: Receiver<WorkerResponse>,
    thread: Option<JoinHandle<()>>,
}

impl SimulationWorker {
    pub fn new(gateway: impl SimulationGateway + 'static) -> Self {
        let (request_tx, request_rx) = channel();
        let (response_tx, response_rx) = channel();

        let ctx = WorkerContext {
            gateway: Box::new(gateway),
            response_tx,
        };

        let thread = thread::spawn(move || {
            ctx.run(request_rx);
        });

        Self {
            request_tx,
            response_rx,
            thread: Some(thread),
        }
    }

    /// Queue a request. Returns false if the worker thread is gone.
    pub fn send(&self, request: WorkerRequest) -> bool {
        self.request_tx.send(request).is_ok()
    }

    /// Try to receive a response (non-blocking)
    pub fn try_recv(&self) -> Option<WorkerResponse> {
        self.response_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a response
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerResponse> {
        match self.response_rx.recv_timeout(timeout) {
            Ok(response) => Some(response),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.request_tx.send(WorkerRequest::Shutdown);
    }
}

impl Drop for SimulationWorker {
    /// An idle worker is joined. One still waiting on the service is detached so
    /// quitting never blocks on the network; its late response has no receiver.
    fn drop(&mut self) {
        self.shutdown();
        let Some(thread) = self.thread.take() else {
            return;
        };

        let deadline = Instant::now() + JOIN_GRACE;
        while !thread.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        if thread.is_finished() {
            let _ = thread.join();
        } else {
            tracing::info!("Detaching simulation worker with a request in flight");
        }
    }
}

struct WorkerContext {
    gateway: Box<dyn SimulationGateway>,
    response_tx: Sender<WorkerResponse>,
}

impl WorkerContext {
    fn run(&self, request_rx: Receiver<WorkerRequest>) {
        while let Ok(request) = request_rx.recv() {
            let response = match request {
                WorkerRequest::Shutdown => break,

                WorkerRequest::Simulate(request) => {
                    tracing::info!(
                        holdings = request.portfolio.stocks.len(),
                        days = request.days,
                        simulations = request.simulations,
                        "Starting remote simulation"
                    );
                    let outcome = self.gateway.simulate(&request);
                    match &outcome {
                        Ok(_) => tracing::info!("Simulation completed"),
                        Err(GatewayError::Transport(cause)) => {
                            tracing::error!(%cause, "Simulation request failed")
                        }
                        Err(e) => tracing::warn!(error = %e, "Simulation rejected"),
                    }
                    WorkerResponse::Simulation(outcome)
                }

                WorkerRequest::HealthCheck => {
                    let status = self.gateway.health();
                    tracing::info!(?status, "Health check finished");
                    WorkerResponse::Health(status)
                }
            };

            if self.response_tx.send(response).is_err() {
                break;
            }
        }
        tracing::debug!("Simulation worker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::stub::{StubGateway, sample_result};
    use std::sync::Mutex;
    use stocksim_core::{PortfolioModel, SimulationParameters};

    const WAIT: Duration = Duration::from_secs(5);

    #[test]
    fn test_simulate_round_trip() {
        let stub = StubGateway::ok(sample_result(10, 3));
        let requests = stub.requests.clone();
        let worker = SimulationWorker::new(stub);

        let request = SimulationRequest::new(
            PortfolioModel::default().snapshot(),
            &SimulationParameters::default(),
        );
        assert!(worker.send(WorkerRequest::Simulate(request.clone())));

        match worker.recv_timeout(WAIT) {
            Some(WorkerResponse::Simulation(Ok(result))) => {
                assert_eq!(result.simulation_data().final_values().len(), 10);
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert_eq!(requests.lock().unwrap().as_slice(), &[request]);
    }

    #[test]
    fn test_failure_is_forwarded() {
        let worker = SimulationWorker::new(StubGateway::failing(GatewayError::Failure(
            "Invalid ticker: ZZZZ".into(),
        )));
        let request = SimulationRequest::new(
            PortfolioModel::default().snapshot(),
            &SimulationParameters::default(),
        );
        worker.send(WorkerRequest::Simulate(request));

        match worker.recv_timeout(WAIT) {
            Some(WorkerResponse::Simulation(Err(GatewayError::Failure(msg)))) => {
                assert_eq!(msg, "Invalid ticker: ZZZZ");
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[test]
    fn test_health_check() {
        let mut stub = StubGateway::ok(sample_result(1, 1));
        stub.health = HealthStatus::Unhealthy("down".into());
        let worker = SimulationWorker::new(stub);

        worker.send(WorkerRequest::HealthCheck);
        match worker.recv_timeout(WAIT) {
            Some(WorkerResponse::Health(status)) => {
                assert_eq!(status, HealthStatus::Unhealthy("down".into()))
            }
            other => panic!("unexpected response: {other:?}"),
        }
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_drop_joins_thread() {
        let worker = SimulationWorker::new(StubGateway::ok(sample_result(1, 1)));
        worker.shutdown();
        drop(worker);
    }

    /// Gateway whose `simulate` blocks until the test releases it.
    struct HangingGateway {
        started: Mutex<Sender<()>>,
        release: Mutex<Receiver<()>>,
    }

    impl SimulationGateway for HangingGateway {
        fn simulate(&self, _request: &SimulationRequest) -> Result<SimulationResult, GatewayError> {
            let _ = self.started.lock().unwrap().send(());
            let _ = self.release.lock().unwrap().recv();
            Err(GatewayError::Transport("released".into()))
        }

        fn health(&self) -> HealthStatus {
            HealthStatus::Healthy
        }
    }

    #[test]
    fn test_drop_does_not_wait_for_in_flight_request() {
        let (started_tx, started_rx) = channel();
        let (release_tx, release_rx) = channel();
        let worker = SimulationWorker::new(HangingGateway {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        });

        let request = SimulationRequest::new(
            PortfolioModel::default().snapshot(),
            &SimulationParameters::default(),
        );
        assert!(worker.send(WorkerRequest::Simulate(request)));
        started_rx.recv_timeout(WAIT).unwrap();

        let dropped_at = Instant::now();
        drop(worker);
        assert!(dropped_at.elapsed() < Duration::from_secs(2));

        // Let the detached thread finish
        drop(release_tx);
    }
}
