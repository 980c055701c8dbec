// Classification Rules - Rules as Data
// Ordered token patterns that decide a merchant's type. First match wins.

use once_cell::sync::Lazy;

use crate::entities::MerchantType;

// ============================================================================
// TOKEN PATTERNS
// ============================================================================

/// Predicate over a token sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPattern {
    /// Token present anywhere
    Token(String),

    /// Exact contiguous, order-preserving window
    Sequence(Vec<String>),

    /// Every sub-pattern matches (not necessarily adjacent)
    AllOf(Vec<TokenPattern>),

    /// At least one sub-pattern matches
    AnyOf(Vec<TokenPattern>),
}

impl TokenPattern {
    pub fn token(token: &str) -> Self {
        TokenPattern::Token(token.to_string())
    }

    pub fn sequence(seq: &[&str]) -> Self {
        TokenPattern::Sequence(seq.iter().map(|s| s.to_string()).collect())
    }

    /// Shorthand for "any of these single tokens"
    pub fn any_token(tokens: &[&str]) -> Self {
        TokenPattern::AnyOf(tokens.iter().map(|t| TokenPattern::token(t)).collect())
    }

    /// Shorthand for "all of these tokens, anywhere"
    pub fn all_tokens(tokens: &[&str]) -> Self {
        TokenPattern::AllOf(tokens.iter().map(|t| TokenPattern::token(t)).collect())
    }

    /// Check if pattern matches the given tokens
    pub fn matches(&self, tokens: &[String]) -> bool {
        match self {
            TokenPattern::Token(t) => tokens.iter().any(|tok| tok == t),
            TokenPattern::Sequence(seq) => has_sequence(tokens, seq),
            TokenPattern::AllOf(parts) => parts.iter().all(|p| p.matches(tokens)),
            TokenPattern::AnyOf(parts) => parts.iter().any(|p| p.matches(tokens)),
        }
    }
}

/// Start offset of the first window of `tokens` equal to `seq`.
pub fn find_sequence<S: AsRef<str>>(tokens: &[String], seq: &[S]) -> Option<usize> {
    if tokens.is_empty() || seq.is_empty() || seq.len() > tokens.len() {
        return None;
    }
    tokens.windows(seq.len()).position(|window| {
        window
            .iter()
            .zip(seq)
            .all(|(tok, want)| tok.as_str() == want.as_ref())
    })
}

/// True if `tokens` contains `seq` as a contiguous window.
pub fn has_sequence<S: AsRef<str>>(tokens: &[String], seq: &[S]) -> bool {
    find_sequence(tokens, seq).is_some()
}

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone)]
pub struct TypeRule {
    /// Rule ID for tracking
    pub id: String,

    /// Type assigned when the pattern matches
    pub merchant_type: MerchantType,

    pub pattern: TokenPattern,

    /// Priority (higher = applied first)
    pub priority: i32,
}

impl TypeRule {
    pub fn new(id: &str, merchant_type: MerchantType, pattern: TokenPattern, priority: i32) -> Self {
        TypeRule {
            id: id.to_string(),
            merchant_type,
            pattern,
            priority,
        }
    }
}

// ============================================================================
// RULE ENGINE
// ============================================================================

pub struct RuleEngine {
    rules: Vec<TypeRule>,
}

impl RuleEngine {
    /// Create a new empty rule engine
    pub fn new() -> Self {
        RuleEngine { rules: Vec::new() }
    }

    /// Create engine from a list of rules
    pub fn from_rules(mut rules: Vec<TypeRule>) -> Self {
        // Stable sort: equal priorities keep insertion order
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        RuleEngine { rules }
    }

    /// Add a single rule
    pub fn add_rule(&mut self, rule: TypeRule) {
        self.rules.push(rule);
        self.rules.sort_by(|a, b| b.priority.cmp(&a.priority));
    }

    /// First rule whose pattern matches, if any
    pub fn matching_rule(&self, tokens: &[String]) -> Option<&TypeRule> {
        if tokens.is_empty() {
            return None;
        }
        self.rules.iter().find(|rule| rule.pattern.matches(tokens))
    }

    /// Classify a token sequence; no match (or no tokens) is `Other`.
    pub fn classify(&self, tokens: &[String]) -> MerchantType {
        self.matching_rule(tokens)
            .map(|rule| rule.merchant_type)
            .unwrap_or(MerchantType::Other)
    }

    /// Get number of rules loaded
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// The built-in Vietnamese merchant rules.
    ///
    /// Categories overlap on token content ("NHA HANG" vs "CUA HANG",
    /// "TIEM TOC" vs "TIEM"), so the order here is load-bearing.
    pub fn vietnamese() -> Self {
        use MerchantType::*;
        use TokenPattern as P;

        RuleEngine::from_rules(vec![
            TypeRule::new(
                "household",
                HouseholdHkd,
                P::AnyOf(vec![P::token("HKD"), P::sequence(&["HO", "KINH", "DOANH"])]),
                100,
            ),
            TypeRule::new("pharmacy", Pharmacy, P::sequence(&["NHA", "THUOC"]), 90),
            TypeRule::new(
                "restaurant",
                RestaurantQuan,
                P::AnyOf(vec![P::sequence(&["QUAN", "AN"]), P::sequence(&["NHA", "HANG"])]),
                80,
            ),
            TypeRule::new(
                "hair_salon",
                HairSalon,
                P::AnyOf(vec![P::all_tokens(&["SALON", "TOC"]), P::sequence(&["TIEM", "TOC"])]),
                70,
            ),
            TypeRule::new("gas", Gas, P::token("GAS"), 60),
            TypeRule::new("cafe", Cafe, P::any_token(&["CAFE", "COFFEE"]), 50),
            TypeRule::new(
                "shop",
                Shop,
                P::AnyOf(vec![
                    P::all_tokens(&["CUA", "HANG"]),
                    P::any_token(&["SHOP", "STORE", "MART"]),
                ]),
                40,
            ),
            TypeRule::new(
                "office",
                OfficeVp,
                P::AnyOf(vec![P::token("VP"), P::sequence(&["VAN", "PHONG"])]),
                30,
            ),
            TypeRule::new(
                "company",
                CompanyCt,
                P::AnyOf(vec![
                    P::any_token(&["CT", "CTY", "TNHH"]),
                    P::all_tokens(&["CONG", "TY"]),
                ]),
                20,
            ),
        ])
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::vietnamese()
    }
}

static DEFAULT_ENGINE: Lazy<RuleEngine> = Lazy::new(RuleEngine::default);

/// Detect the merchant type of a token sequence with the built-in rules.
pub fn detect_type(tokens: &[String]) -> MerchantType {
    DEFAULT_ENGINE.classify(tokens)
}

// ============================================================================
// TESTS
// ============================================================================
