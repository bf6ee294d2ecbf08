// Static reference data: named instruments, educational scenarios and tips.
// Loaded once at compile time; everything here is read-only.

use rand::Rng;

/// Immutable reference data for one tracked symbol.
#[derive(Debug, Clone, Copy)]
pub struct Instrument {
    pub symbol: &'static str,
    pub name: &'static str,
    pub sector: &'static str,
    pub market_cap: &'static str,
    /// Educational reference price the random walk is anchored to.
    pub base_price: f64,
    /// Annualized volatility as a decimal.
    pub volatility: f64,
}

/// Defaults applied to symbols we have no reference data for.
pub const DEFAULT_BASE_PRICE: f64 = 1000.0;
pub const DEFAULT_VOLATILITY: f64 = 0.25;

pub static INSTRUMENTS: &[Instrument] = &[
    Instrument { symbol: "NIFTY", name: "Nifty 50", sector: "Index", market_cap: "Index", base_price: 19800.0, volatility: 0.15 },
    Instrument { symbol: "BANKNIFTY", name: "Bank Nifty", sector: "Index", market_cap: "Index", base_price: 44500.0, volatility: 0.18 },
    Instrument { symbol: "SENSEX", name: "Sensex", sector: "Index", market_cap: "Index", base_price: 66000.0, volatility: 0.15 },
    Instrument { symbol: "RELIANCE", name: "Reliance Industries Ltd", sector: "Oil & Gas", market_cap: "16,60,000 Cr", base_price: 2450.0, volatility: 0.25 },
    Instrument { symbol: "TCS", name: "Tata Consultancy Services", sector: "IT Services", market_cap: "13,40,000 Cr", base_price: 3650.0, volatility: 0.22 },
    Instrument { symbol: "HDFC", name: "HDFC Bank Ltd", sector: "Banking", market_cap: "11,80,000 Cr", base_price: 1580.0, volatility: 0.28 },
    Instrument { symbol: "INFY", name: "Infosys Ltd", sector: "IT Services", market_cap: "6,20,000 Cr", base_price: 1420.0, volatility: 0.24 },
    Instrument { symbol: "ICICIBANK", name: "ICICI Bank Ltd", sector: "Banking", market_cap: "6,70,000 Cr", base_price: 950.0, volatility: 0.30 },
    Instrument { symbol: "HDFCBANK", name: "HDFC Bank Ltd", sector: "Banking", market_cap: "12,50,000 Cr", base_price: 1650.0, volatility: 0.25 },
    Instrument { symbol: "WIPRO", name: "Wipro Ltd", sector: "IT Services", market_cap: "2,30,000 Cr", base_price: 420.0, volatility: 0.28 },
    Instrument { symbol: "BHARTIARTL", name: "Bharti Airtel Ltd", sector: "Telecom", market_cap: "5,10,000 Cr", base_price: 880.0, volatility: 0.26 },
    Instrument { symbol: "ITC", name: "ITC Ltd", sector: "FMCG", market_cap: "5,40,000 Cr", base_price: 410.0, volatility: 0.20 },
    Instrument { symbol: "KOTAKBANK", name: "Kotak Mahindra Bank", sector: "Banking", market_cap: "3,50,000 Cr", base_price: 1780.0, volatility: 0.32 },
    Instrument { symbol: "LT", name: "Larsen & Toubro Ltd", sector: "Infrastructure", market_cap: "4,40,000 Cr", base_price: 3200.0, volatility: 0.24 },
    Instrument { symbol: "MARUTI", name: "Maruti Suzuki India Ltd", sector: "Automobile", market_cap: "3,20,000 Cr", base_price: 10500.0, volatility: 0.26 },
];

/// Symbols used when a synthetic trending list has to be produced.
pub static TRENDING_SYMBOLS: &[&str] = &["RELIANCE", "TCS", "HDFC", "INFY", "ICICIBANK"];

pub fn lookup(symbol: &str) -> Option<&'static Instrument> {
    INSTRUMENTS.iter().find(|i| i.symbol.eq_ignore_ascii_case(symbol))
}

pub fn base_price(symbol: &str) -> f64 {
    lookup(symbol).map(|i| i.base_price).unwrap_or(DEFAULT_BASE_PRICE)
}

pub fn volatility(symbol: &str) -> f64 {
    lookup(symbol).map(|i| i.volatility).unwrap_or(DEFAULT_VOLATILITY)
}

pub fn is_index(symbol: &str) -> bool {
    lookup(symbol).map(|i| i.sector == "Index").unwrap_or(false)
}

/// Educational trading scenario for one experience level.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    pub level: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub initial_money: u64,
    pub recommended: &'static [&'static str],
    pub lessons: &'static [&'static str],
}

pub static SCENARIOS: &[Scenario] = &[
    Scenario {
        level: "beginner",
        name: "Basic Trading",
        description: "Learn the basics of buying and selling stocks",
        initial_money: 50_000,
        recommended: &["TCS", "RELIANCE", "HDFC"],
        lessons: &[
            "Start with blue-chip stocks",
            "Understand market orders vs limit orders",
            "Learn about profit and loss calculations",
        ],
    },
    Scenario {
        level: "intermediate",
        name: "Portfolio Management",
        description: "Learn diversification and risk management",
        initial_money: 100_000,
        recommended: &["TCS", "RELIANCE", "HDFC", "INFY"],
        lessons: &[
            "Diversify across sectors",
            "Monitor your portfolio regularly",
            "Understand market trends",
        ],
    },
    Scenario {
        level: "advanced",
        name: "Advanced Strategies",
        description: "Learn advanced trading concepts",
        initial_money: 200_000,
        recommended: &["NIFTY", "BANKNIFTY", "RELIANCE", "TCS", "MARUTI"],
        lessons: &[
            "Technical analysis basics",
            "Index investing strategies",
            "Risk-reward ratios",
        ],
    },
];

pub fn scenario(level: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.level.eq_ignore_ascii_case(level))
}

static TIPS: &[&str] = &[
    "Never invest money you cannot afford to lose",
    "Diversification helps reduce risk in your portfolio",
    "Time in the market beats timing the market",
    "Always research before investing in any stock",
    "Set clear investment goals and stick to your plan",
    "Understand the company's fundamentals before buying",
    "Balance risk and reward in your investment decisions",
    "Start with small amounts and gradually increase",
    "Keep track of all your transactions and performance",
    "Stay informed about market news and trends",
];

pub fn random_tip() -> &'static str {
    TIPS[rand::thread_rng().gen_range(0..TIPS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup("reliance").map(|i| i.symbol), Some("RELIANCE"));
        assert_eq!(lookup("TCS").map(|i| i.base_price), Some(3650.0));
        assert!(lookup("NOPE").is_none());
    }

    #[test]
    fn unknown_symbols_get_defaults() {
        assert_eq!(base_price("UNLISTED"), DEFAULT_BASE_PRICE);
        assert_eq!(volatility("UNLISTED"), DEFAULT_VOLATILITY);
        assert!(!is_index("UNLISTED"));
    }

    #[test]
    fn indices_are_flagged() {
        assert!(is_index("NIFTY"));
        assert!(is_index("SENSEX"));
        assert!(!is_index("RELIANCE"));
    }

    #[test]
    fn scenarios_cover_all_levels() {
        for level in ["beginner", "intermediate", "advanced"] {
            let s = scenario(level).expect("scenario exists");
            assert!(s.initial_money > 0);
            assert!(!s.recommended.is_empty());
            assert!(!s.lessons.is_empty());
        }
    }

    #[test]
    fn random_tip_returns_something() {
        assert!(!random_tip().is_empty());
    }
}
