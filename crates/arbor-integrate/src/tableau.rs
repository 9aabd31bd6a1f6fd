//! Butcher tableaus for the embedded Runge-Kutta pairs.

use crate::config::Method;

/// An explicit embedded Runge-Kutta pair.
///
/// `b` gives the propagated solution; `e` gives the error estimate
/// (difference between the two embedded solutions), so `sum(e) == 0`.
#[derive(Debug)]
pub struct Tableau {
    pub name: &'static str,
    /// Order of the error estimate's leading term.
    pub order: u32,
    pub c: &'static [f64],
    /// Strictly lower-triangular rows; row `i` has `i` entries.
    pub a: &'static [&'static [f64]],
    pub b: &'static [f64],
    pub e: &'static [f64],
}

impl Tableau {
    pub fn stages(&self) -> usize {
        self.c.len()
    }
}

pub static MERSON: Tableau = Tableau {
    name: "Kutta-Merson",
    order: 4,
    c: &[0.0, 1.0 / 3.0, 1.0 / 3.0, 0.5, 1.0],
    a: &[
        &[],
        &[1.0 / 3.0],
        &[1.0 / 6.0, 1.0 / 6.0],
        &[1.0 / 8.0, 0.0, 3.0 / 8.0],
        &[0.5, 0.0, -1.5, 2.0],
    ],
    b: &[1.0 / 6.0, 0.0, 0.0, 2.0 / 3.0, 1.0 / 6.0],
    e: &[-1.0 / 15.0, 0.0, 3.0 / 10.0, -4.0 / 15.0, 1.0 / 30.0],
};

pub static CASH_KARP: Tableau = Tableau {
    name: "Cash-Karp",
    order: 4,
    c: &[0.0, 0.2, 0.3, 0.6, 1.0, 0.875],
    a: &[
        &[],
        &[0.2],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[0.3, -0.9, 1.2],
        &[-11.0 / 54.0, 2.5, -70.0 / 27.0, 35.0 / 27.0],
        &[
            1631.0 / 55296.0,
            175.0 / 512.0,
            575.0 / 13824.0,
            44275.0 / 110592.0,
            253.0 / 4096.0,
        ],
    ],
    b: &[
        37.0 / 378.0,
        0.0,
        250.0 / 621.0,
        125.0 / 594.0,
        0.0,
        512.0 / 1771.0,
    ],
    e: &[
        37.0 / 378.0 - 2825.0 / 27648.0,
        0.0,
        250.0 / 621.0 - 18575.0 / 48384.0,
        125.0 / 594.0 - 13525.0 / 55296.0,
        -277.0 / 14336.0,
        512.0 / 1771.0 - 0.25,
    ],
};

impl Method {
    pub fn tableau(self) -> &'static Tableau {
        match self {
            Method::Merson => &MERSON,
            Method::CashKarp => &CASH_KARP,
        }
    }
}
