//! In-memory resolver and pinger used by unit tests.

use crate::dns::resolver::{Resolve, ResolverFactory};
use crate::dns::types::{LatencyResult, QueryOutcome};
use crate::error::{Error, Result};
use crate::ping::Reachability;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use trust_dns_resolver::proto::rr::RecordType;

pub fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[derive(Default)]
struct Table {
    answers: HashMap<(IpAddr, RecordType), QueryOutcome>,
    delays: HashMap<IpAddr, Duration>,
    delay: Duration,
    queries: Mutex<Vec<(IpAddr, String, RecordType)>>,
    limits: Mutex<Vec<Duration>>,
}

/// Scripted resolvers: unknown `(nameserver, type)` pairs time out.
#[derive(Default)]
pub struct FakeFactory {
    table: Arc<Table>,
    broken: HashSet<IpAddr>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    fn table_mut(&mut self) -> &mut Table {
        Arc::get_mut(&mut self.table).expect("configure before binding")
    }

    pub fn answer(mut self, ns: &str, record_type: RecordType, outcome: QueryOutcome) -> Self {
        self.table_mut().answers.insert((ip(ns), record_type), outcome);
        self
    }

    /// Delay applied to every lookup.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.table_mut().delay = delay;
        self
    }

    /// Delay applied to lookups against `ns`, overriding [`FakeFactory::delay`].
    pub fn delay_for(mut self, ns: &str, delay: Duration) -> Self {
        self.table_mut().delays.insert(ip(ns), delay);
        self
    }

    /// Binding to `ns` fails.
    pub fn broken(mut self, ns: &str) -> Self {
        self.broken.insert(ip(ns));
        self
    }

    /// Queries issued so far, in the order they reached the resolver.
    pub fn queries(&self) -> Vec<(IpAddr, String, RecordType)> {
        self.table.queries.lock().unwrap().clone()
    }

    /// Time limits handed to each lookup, in arrival order.
    pub fn limits(&self) -> Vec<Duration> {
        self.table.limits.lock().unwrap().clone()
    }
}

impl ResolverFactory for FakeFactory {
    fn bind(&self, nameserver: IpAddr) -> Result<Arc<dyn Resolve>> {
        if self.broken.contains(&nameserver) {
            return Err(Error::config(format!("cannot bind {nameserver}")));
        }
        Ok(Arc::new(FakeResolve {
            nameserver,
            table: Arc::clone(&self.table),
        }))
    }
}

struct FakeResolve {
    nameserver: IpAddr,
    table: Arc<Table>,
}

#[async_trait]
impl Resolve for FakeResolve {
    async fn lookup(
        &self,
        name: &str,
        record_type: RecordType,
        limit: Duration,
    ) -> QueryOutcome {
        self.table.limits.lock().unwrap().push(limit);
        self.table
            .queries
            .lock()
            .unwrap()
            .push((self.nameserver, name.to_string(), record_type));
        let delay = self
            .table
            .delays
            .get(&self.nameserver)
            .copied()
            .unwrap_or(self.table.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.table
            .answers
            .get(&(self.nameserver, record_type))
            .cloned()
            .unwrap_or(QueryOutcome::Timeout)
    }
}

/// Scripted pinger: unknown targets time out.
#[derive(Default)]
pub struct FakePinger {
    replies: HashMap<IpAddr, LatencyResult>,
    delays: HashMap<IpAddr, Duration>,
    probed: Mutex<Vec<(IpAddr, Duration)>>,
}

impl FakePinger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, target: &str, result: LatencyResult) -> Self {
        self.replies.insert(ip(target), result);
        self
    }

    pub fn delay_for(mut self, target: &str, delay: Duration) -> Self {
        self.delays.insert(ip(target), delay);
        self
    }

    pub fn probed(&self) -> Vec<(IpAddr, Duration)> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl Reachability for FakePinger {
    async fn probe(&self, target: IpAddr, limit: Duration) -> LatencyResult {
        self.probed.lock().unwrap().push((target, limit));
        if let Some(delay) = self.delays.get(&target) {
            tokio::time::sleep(*delay).await;
        }
        self.replies
            .get(&target)
            .copied()
            .unwrap_or(LatencyResult::Timeout)
    }
}
