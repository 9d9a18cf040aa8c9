use getset::CopyGetters;
use scr_abi::prelude::*;

use super::mmio::Mmio;

// Register numbers, scaled by `reg_shift` into byte offsets.
const UART_RBR: u64 = 0; // In:  Receive buffer
const UART_THR: u64 = 0; // Out: Transmitter holding
const UART_DLL: u64 = 0; // Out: Divisor latch low
const UART_IER: u64 = 1; // I/O: Interrupt enable
const UART_DLM: u64 = 1; // Out: Divisor latch high
const UART_FCR: u64 = 2; // Out: FIFO control
const UART_LCR: u64 = 3; // Out: Line control
const UART_MCR: u64 = 4; // Out: Modem control
const UART_LSR: u64 = 5; // In:  Line status
const UART_SCR: u64 = 7; // I/O: Scratch

const LCR_DLAB: u32 = 0x80;
const LCR_8N1: u32 = 0x03;
const FCR_ENABLE: u32 = 0x01;
const LSR_DR: u32 = 0x01;
const LSR_THRE: u32 = 0x20;

/// NS16550-compatible UART behind memory-mapped registers.
#[derive(Debug, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct Uart8250<M> {
    #[getset(skip)]
    mmio: M,
    base: u64,
    /// Input clock in Hz.
    input_frequency: u32,
    baud: u32,
    /// log2 of the distance between registers.
    reg_shift: u32,
    /// Access width in bytes: 1, 2 or 4.
    reg_width: u32,
}

impl<M> Uart8250<M> {
    pub const fn new(
        mmio: M,
        base: u64,
        input_frequency: u32,
        baud: u32,
        reg_shift: u32,
        reg_width: u32,
    ) -> Uart8250<M> {
        Uart8250 {
            mmio,
            base,
            input_frequency,
            baud,
            reg_shift,
            reg_width,
        }
    }

    /// Baud rate divisor, rounded to nearest. Zero leaves the latch alone.
    pub fn divisor(&self) -> u32 {
        if self.baud == 0 {
            return 0;
        }
        let baud = self.baud as u64;
        ((self.input_frequency as u64 + 8 * baud) / (16 * baud)) as u32
    }
}

impl<M: Mmio> Uart8250<M> {
    fn reg_addr(&self, num: u64) -> u64 {
        self.base + (num << self.reg_shift)
    }

    fn get_reg(&self, num: u64) -> u32 {
        let addr = self.reg_addr(num);
        match self.reg_width {
            1 => self.mmio.read8(addr) as u32,
            2 => self.mmio.read16(addr) as u32,
            _ => self.mmio.read32(addr),
        }
    }

    fn set_reg(&self, num: u64, value: u32) {
        let addr = self.reg_addr(num);
        match self.reg_width {
            1 => self.mmio.write8(addr, value as u8),
            2 => self.mmio.write16(addr, value as u16),
            _ => self.mmio.write32(addr, value),
        }
    }

    /// Program 8N1 at the configured baud rate with FIFOs on and interrupts off.
    pub fn init(&self) {
        let divisor = self.divisor();

        self.set_reg(UART_IER, 0);
        self.set_reg(UART_LCR, LCR_DLAB);
        if divisor != 0 {
            self.set_reg(UART_DLL, divisor & 0xff);
            self.set_reg(UART_DLM, (divisor >> 8) & 0xff);
        }
        self.set_reg(UART_LCR, LCR_8N1);
        self.set_reg(UART_FCR, FCR_ENABLE);
        self.set_reg(UART_MCR, 0);

        // Drain stale status and data.
        self.get_reg(UART_LSR);
        self.get_reg(UART_RBR);
        self.set_reg(UART_SCR, 0);
    }

    pub fn putc(&self, byte: u8) {
        while self.get_reg(UART_LSR) & LSR_THRE == 0 {}
        self.set_reg(UART_THR, byte as u32);
    }

    pub fn getc(&self) -> Option<u8> {
        if self.get_reg(UART_LSR) & LSR_DR != 0 {
            Some(self.get_reg(UART_RBR) as u8)
        } else {
            None
        }
    }
}

impl<M: Mmio> ConsoleDevice for Uart8250<M> {
    fn putc(&self, byte: u8) {
        Uart8250::putc(self, byte)
    }

    fn getc(&self) -> Option<u8> {
        Uart8250::getc(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::mmio::fake::FakeMmio;

    const BASE: u64 = 0x1000_0000;

    #[test]
    fn divisor_rounds_to_nearest() {
        let uart = Uart8250::new((), BASE, 50_000_000, 115_200, 2, 4);
        assert_eq!(uart.divisor(), 27);
        let uart = Uart8250::new((), BASE, 1_843_200, 115_200, 0, 1);
        assert_eq!(uart.divisor(), 1);
        let uart = Uart8250::new((), BASE, 1_843_200, 0, 0, 1);
        assert_eq!(uart.divisor(), 0);
    }

    #[test]
    fn divisor_of_extreme_clocks() {
        let uart = Uart8250::new((), BASE, u32::MAX, u32::MAX, 0, 1);
        assert_eq!(uart.divisor(), 0);
        let uart = Uart8250::new((), BASE, u32::MAX, 300_000_000, 0, 1);
        assert_eq!(uart.divisor(), 1);
        let uart = Uart8250::new((), BASE, u32::MAX, 1, 0, 1);
        assert_eq!(uart.divisor(), 268_435_456);
    }

    #[test]
    fn init_uses_shifted_registers() {
        let mmio = FakeMmio::default();
        let uart = Uart8250::new(&mmio, BASE, 50_000_000, 115_200, 2, 4);
        uart.init();
        assert_eq!(
            mmio.writes(),
            vec![
                (BASE + 4, 0),
                (BASE + 12, 0x80),
                (BASE, 27),
                (BASE + 4, 0),
                (BASE + 12, 0x03),
                (BASE + 8, 0x01),
                (BASE + 16, 0),
                (BASE + 28, 0),
            ]
        );
    }

    #[test]
    fn putc_waits_for_transmitter() {
        let mmio = FakeMmio::default();
        mmio.preset(BASE + 5, LSR_THRE);
        let uart = Uart8250::new(&mmio, BASE, 1_843_200, 115_200, 0, 1);
        uart.putc(b'S');
        assert_eq!(mmio.writes(), vec![(BASE, b'S' as u32)]);
    }

    #[test]
    fn getc_checks_data_ready() {
        let mmio = FakeMmio::default();
        let uart = Uart8250::new(&mmio, BASE, 1_843_200, 115_200, 0, 1);
        assert_eq!(uart.getc(), None);

        mmio.preset(BASE + 5, LSR_DR);
        mmio.preset(BASE, b'r' as u32);
        assert_eq!(uart.getc(), Some(b'r'));
    }
}
