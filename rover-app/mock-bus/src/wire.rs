//! In-process two-wire bus.
//!
//! Every node gets a [`SimTwi`] port implementing `TwiRegisters` over one shared [`Wire`]. A
//! control write with `TWINT` set from a master is turned into a bus action (START, address,
//! data, STOP). An action that needs the addressed slave waits until that slave has cleared its
//! own interrupt flag, exactly like clock stretching on a real bus; waiting actions are retried
//! after every register write.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
};

use heapless::Vec;
use rover_core::utils::{
    bus::twi::{TWEA, TWEN, TWINT, TWSTA, TWSTO},
    TwiRegisters,
};
use tracing::trace;

/// Ports a wire can carry.
pub const MAX_PORTS: usize = 4;

const PERSISTENT: u8 = !(TWINT | TWSTA | TWSTO);

#[derive(Debug, Default, Clone, Copy)]
struct Port {
    control: u8,
    twint: bool,
    status: u8,
    data: u8,
    address: u8,
    mask: u8,
    bit_rate: u8,
}

impl Port {
    fn raise(&mut self, status: u8) {
        self.status = status;
        self.twint = true;
    }

    fn acks(&self) -> bool {
        self.control & TWEA != 0
    }

    fn answers(&self, sla: u8) -> bool {
        self.control & TWEN != 0 && self.acks() && (sla ^ self.address) & 0xFE & !self.mask == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Idle,
    /// START sent, nobody addressed yet (or the slave left the transfer).
    Owned { master: usize },
    Write { master: usize, slave: usize },
    Read { master: usize, slave: usize },
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Start,
    Stop,
    /// Plain `TWINT` clear: address, data byte or read request depending on the link.
    Clear { data: u8, ack: bool },
}

#[derive(Debug)]
pub struct Wire {
    ports: Vec<Port, MAX_PORTS>,
    link: Link,
    waiting: VecDeque<(usize, Action)>,
}

impl Wire {
    pub fn new() -> Self {
        Self {
            ports: Vec::new(),
            link: Link::Idle,
            waiting: VecDeque::new(),
        }
    }

    fn attach(&mut self) -> Option<usize> {
        self.ports.push(Port::default()).ok()?;
        Some(self.ports.len() - 1)
    }

    fn write_control(&mut self, port: usize, value: u8) {
        self.ports[port].control = value & PERSISTENT;
        if value & TWINT != 0 {
            self.ports[port].twint = false;
            self.ports[port].status = 0xF8;
            if self.is_master(port) || value & TWSTA != 0 {
                let action = if value & TWSTA != 0 {
                    Action::Start
                } else if value & TWSTO != 0 {
                    Action::Stop
                } else {
                    Action::Clear {
                        data: self.ports[port].data,
                        ack: value & TWEA != 0,
                    }
                };
                self.waiting.push_back((port, action));
            } else if value & TWSTO != 0 {
                trace!(port, "slave released the lines");
            }
        }
        self.drain();
    }

    fn is_master(&self, port: usize) -> bool {
        match self.link {
            Link::Idle => false,
            Link::Owned { master } | Link::Write { master, .. } | Link::Read { master, .. } => {
                master == port
            }
        }
    }

    fn drain(&mut self) {
        while let Some(&(port, action)) = self.waiting.front() {
            if !self.perform(port, action) {
                break;
            }
            self.waiting.pop_front();
        }
    }

    /// Carry out one master action; false if it has to wait.
    fn perform(&mut self, master: usize, action: Action) -> bool {
        match action {
            Action::Start => self.start(master),
            Action::Stop => self.stop(master),
            Action::Clear { data, ack } => match self.link {
                Link::Owned { .. } => self.address(master, data),
                Link::Write { slave, .. } => self.transmit(master, slave, data),
                Link::Read { slave, .. } => self.receive(master, slave, ack),
                Link::Idle => {
                    trace!(master, "clear outside a transfer ignored");
                    true
                }
            },
        }
    }

    fn ready(&self, slave: usize) -> bool {
        !self.ports[slave].twint
    }

    fn start(&mut self, master: usize) -> bool {
        match self.link {
            Link::Idle => {
                self.link = Link::Owned { master };
                self.ports[master].raise(0x08);
                true
            }
            Link::Owned { master: owner } if owner == master => {
                self.ports[master].raise(0x10);
                true
            }
            Link::Write { master: owner, slave } if owner == master => {
                if !self.ready(slave) {
                    return false;
                }
                self.ports[slave].raise(0xA0);
                self.link = Link::Owned { master };
                self.ports[master].raise(0x10);
                true
            }
            Link::Read { master: owner, .. } if owner == master => {
                self.link = Link::Owned { master };
                self.ports[master].raise(0x10);
                true
            }
            // another master holds the bus
            _ => false,
        }
    }

    fn stop(&mut self, master: usize) -> bool {
        if let Link::Write { slave, .. } = self.link {
            if !self.ready(slave) {
                return false;
            }
            self.ports[slave].raise(0xA0);
        }
        trace!(master, "stop");
        self.link = Link::Idle;
        true
    }

    fn address(&mut self, master: usize, sla: u8) -> bool {
        let read = sla & 1 != 0;
        let target = (0..self.ports.len()).find(|&p| p != master && self.ports[p].answers(sla));
        let Some(slave) = target else {
            self.ports[master].raise(if read { 0x48 } else { 0x20 });
            return true;
        };
        if !self.ready(slave) {
            return false;
        }
        if read {
            self.link = Link::Read { master, slave };
            self.ports[slave].raise(0xA8);
            self.ports[master].raise(0x40);
        } else {
            self.link = Link::Write { master, slave };
            self.ports[slave].raise(0x60);
            self.ports[master].raise(0x18);
        }
        true
    }

    fn transmit(&mut self, master: usize, slave: usize, byte: u8) -> bool {
        if !self.ready(slave) {
            return false;
        }
        if self.ports[slave].acks() {
            self.ports[slave].data = byte;
            self.ports[slave].raise(0x80);
            self.ports[master].raise(0x28);
        } else {
            self.ports[slave].raise(0x88);
            self.ports[master].raise(0x30);
        }
        true
    }

    fn receive(&mut self, master: usize, slave: usize, ack: bool) -> bool {
        if !self.ready(slave) {
            return false;
        }
        let more = self.ports[slave].acks();
        self.ports[master].data = self.ports[slave].data;
        self.ports[master].raise(if ack { 0x50 } else { 0x58 });
        let slave_status = match (ack, more) {
            (true, true) => 0xB8,
            (true, false) => 0xC8,
            (false, _) => 0xC0,
        };
        self.ports[slave].raise(slave_status);
        if slave_status != 0xB8 {
            self.link = Link::Owned { master };
        }
        true
    }
}

impl Default for Wire {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a [`Wire`].
#[derive(Debug, Clone, Default)]
pub struct Bus(Arc<Mutex<Wire>>);

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a new node; `None` once [`MAX_PORTS`] are in use.
    pub fn port(&self) -> Option<SimTwi> {
        let port = self.lock().attach()?;
        Some(SimTwi {
            bus: self.clone(),
            port,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Wire> {
        // a panicking node thread must not wedge the others
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One node's view of the bus.
#[derive(Debug, Clone)]
pub struct SimTwi {
    bus: Bus,
    port: usize,
}

impl SimTwi {
    fn with<T>(&self, f: impl FnOnce(&Port) -> T) -> T {
        f(&self.bus.lock().ports[self.port])
    }

    fn with_mut(&self, f: impl FnOnce(&mut Port)) {
        f(&mut self.bus.lock().ports[self.port]);
    }
}

impl TwiRegisters for SimTwi {
    fn control(&self) -> u8 {
        let (control, twint) = self.with(|p| (p.control, p.twint));
        if twint {
            control | TWINT
        } else {
            std::thread::yield_now();
            control
        }
    }

    fn set_control(&mut self, value: u8) {
        self.bus.lock().write_control(self.port, value);
    }

    fn status(&self) -> u8 {
        self.with(|p| if p.twint { p.status } else { 0xF8 })
    }

    fn data(&self) -> u8 {
        self.with(|p| p.data)
    }

    fn set_data(&mut self, value: u8) {
        self.with_mut(|p| p.data = value);
    }

    fn address(&self) -> u8 {
        self.with(|p| p.address)
    }

    fn set_address(&mut self, value: u8) {
        self.with_mut(|p| p.address = value);
    }

    fn set_address_mask(&mut self, value: u8) {
        self.with_mut(|p| p.mask = value);
    }

    fn set_bit_rate(&mut self, value: u8) {
        self.with_mut(|p| p.bit_rate = value);
    }
}
