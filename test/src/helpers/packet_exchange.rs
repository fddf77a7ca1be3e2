use log::debug;

use naia_replica_client::{ClientConfig, RemoteWorld};
use naia_replica_server::{HostWorld, ObserverKey, ServerConfig};
use naia_replica_shared::{ChangeTracker, DeltaPacket, Replicator};

use super::{mirror_of, TestEntity};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Delivery {
    Deliver,
    Drop,
}

pub struct TestClient {
    pub observer: ObserverKey,
    pub remote: RemoteWorld<TestEntity>,
}

/// One host and any number of clients, joined by an in-memory link
pub struct TestSession {
    pub host: HostWorld<TestEntity>,
    pub clients: Vec<TestClient>,
    next_entity: u64,
}

impl TestSession {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            host: HostWorld::new(config),
            clients: Vec::new(),
            next_entity: 0,
        }
    }

    /// Registers `root` on the host and a mirror of it on every client
    pub fn spawn(&mut self, root: ChangeTracker) -> TestEntity {
        let entity = TestEntity::new(self.next_entity);
        self.next_entity += 1;
        for client in &mut self.clients {
            client.remote.insert_mirror(entity, mirror_of(&root));
        }
        self.host.register_root(entity, root);
        entity
    }

    /// Connects a client that mirrors every root spawned so far
    pub fn add_client(&mut self) -> usize {
        let observer = self.host.add_observer();
        let mut remote = RemoteWorld::new(ClientConfig::default());
        for entity in self.host.root_keys() {
            if let Some(root) = self.host.root(entity) {
                remote.insert_mirror(*entity, mirror_of(root));
            }
        }
        self.clients.push(TestClient { observer, remote });
        self.clients.len() - 1
    }

    pub fn client(&self, index: usize) -> &TestClient {
        &self.clients[index]
    }

    pub fn mirror(&self, index: usize, entity: TestEntity) -> Option<&ChangeTracker> {
        self.clients[index].remote.mirror(&entity)
    }

    /// Runs one round and delivers every packet
    pub fn exchange(&mut self) -> usize {
        self.exchange_with(|_, _| Delivery::Deliver)
    }

    /// Runs `n` rounds, delivering every packet
    pub fn exchange_n_times(&mut self, n: usize) {
        for _ in 0..n {
            self.exchange();
        }
    }

    /// Runs one round, letting `deliver` decide the fate of each packet.
    /// Delivered packets are acknowledged right away. Returns how many were
    /// delivered.
    pub fn exchange_with<F>(&mut self, mut deliver: F) -> usize
    where
        F: FnMut(ObserverKey, &DeltaPacket<TestEntity>) -> Delivery,
    {
        let mut delivered = 0;
        for (observer, packet) in self.host.send_round() {
            if deliver(observer, &packet) == Delivery::Drop {
                debug!(
                    "dropped window ({}, {}] for {:?}",
                    packet.from, packet.to, observer
                );
                continue;
            }
            let Some(client) = self
                .clients
                .iter_mut()
                .find(|client| client.observer == observer)
            else {
                continue;
            };
            client.remote.receive_packet(packet);
            self.host.ack(&observer, client.remote.applied_version());
            delivered += 1;
        }
        delivered
    }

    /// Compares every client's mirror of `entity` with the host's root
    pub fn check_converged(&self, entity: TestEntity) -> Result<(), String> {
        let root = self
            .host
            .root(&entity)
            .ok_or_else(|| format!("host has no root {:?}", entity))?;
        let expected = root.target();
        for (index, client) in self.clients.iter().enumerate() {
            let mirror = client
                .remote
                .mirror(&entity)
                .ok_or_else(|| format!("client {} has no mirror of {:?}", index, entity))?;
            let actual = mirror.target();
            if actual != expected {
                return Err(format!(
                    "client {} diverged on {:?}: expected {:?}, got {:?}",
                    index, entity, expected, actual
                ));
            }
        }
        Ok(())
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}
