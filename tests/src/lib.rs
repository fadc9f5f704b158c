//! End-to-end scans against a [`responder::SimulatedHost`].

pub mod responder;

#[cfg(test)]
mod scan;
