#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use rover_core::utils::{
    bus::twi::{TWINT, TWSTO},
    time::{Instant, Monotonic},
    TwiRegisters,
};

/// One bus event: the status the peripheral reports and the byte in its data register.
#[derive(Debug, Clone, Copy)]
pub struct Event {
    pub status: u8,
    pub data: u8,
}

pub fn ev(status: u8) -> Event {
    Event { status, data: 0 }
}

pub fn data(status: u8, data: u8) -> Event {
    Event { status, data }
}

#[derive(Default)]
struct State {
    pending: Option<Event>,
    script: VecDeque<Event>,
    controls: Vec<u8>,
    written: Vec<u8>,
    address: u8,
    mask: u8,
    bit_rate: u8,
}

/// Register file that replays a script of bus events.
///
/// Each control write with `TWINT` set clears the pending event and raises the next scripted
/// one; an exhausted script leaves the flag low. Clones share state so a test can inspect it
/// after handing a clone to the driver.
#[derive(Clone, Default)]
pub struct ScriptedTwi(Rc<RefCell<State>>);

impl ScriptedTwi {
    pub fn new(script: impl IntoIterator<Item = Event>) -> Self {
        let regs = Self::default();
        regs.0.borrow_mut().script = script.into_iter().collect();
        regs
    }

    /// Raise the first scripted event without a control write (an incoming transfer).
    pub fn raise(&self) {
        let mut state = self.0.borrow_mut();
        state.pending = state.script.pop_front();
    }

    pub fn push(&self, events: impl IntoIterator<Item = Event>) {
        self.0.borrow_mut().script.extend(events);
    }

    pub fn written(&self) -> Vec<u8> {
        self.0.borrow().written.clone()
    }

    pub fn controls(&self) -> Vec<u8> {
        self.0.borrow().controls.clone()
    }

    pub fn sent_stop(&self) -> bool {
        self.0.borrow().controls.iter().any(|c| c & TWSTO != 0)
    }

    pub fn own_address(&self) -> u8 {
        self.0.borrow().address
    }

    pub fn mask(&self) -> u8 {
        self.0.borrow().mask
    }

    pub fn bit_rate(&self) -> u8 {
        self.0.borrow().bit_rate
    }

    pub fn is_drained(&self) -> bool {
        let state = self.0.borrow();
        state.pending.is_none() && state.script.is_empty()
    }
}

impl TwiRegisters for ScriptedTwi {
    fn control(&self) -> u8 {
        if self.0.borrow().pending.is_some() {
            TWINT
        } else {
            0
        }
    }

    fn set_control(&mut self, value: u8) {
        let mut state = self.0.borrow_mut();
        state.controls.push(value);
        if value & TWINT != 0 {
            state.pending = state.script.pop_front();
        }
    }

    fn status(&self) -> u8 {
        self.0.borrow().pending.map_or(0xF8, |event| event.status)
    }

    fn data(&self) -> u8 {
        self.0.borrow().pending.map_or(0, |event| event.data)
    }

    fn set_data(&mut self, value: u8) {
        self.0.borrow_mut().written.push(value);
    }

    fn address(&self) -> u8 {
        self.0.borrow().address
    }

    fn set_address(&mut self, value: u8) {
        self.0.borrow_mut().address = value;
    }

    fn set_address_mask(&mut self, value: u8) {
        self.0.borrow_mut().mask = value;
    }

    fn set_bit_rate(&mut self, value: u8) {
        self.0.borrow_mut().bit_rate = value;
    }
}

/// Clock advanced by hand.
#[derive(Default)]
pub struct ManualClock(Cell<u64>);

impl ManualClock {
    pub fn advance(&self, ticks: u64) {
        self.0.set(self.0.get() + ticks);
    }
}

impl Monotonic for ManualClock {
    fn now(&self) -> Instant {
        Instant::from_ticks(self.0.get())
    }
}
