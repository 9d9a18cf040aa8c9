/// Register access seam.
pub mod mmio;

/// NS16550-compatible UART.
pub mod uart8250;

/// Platform-level interrupt controller.
pub mod plic;

/// CSR-mapped machine timer of SCR7 cores.
pub mod mtimer;
