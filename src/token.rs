use std::fmt;
use std::str::FromStr;

use alloy::primitives::Address;

use crate::config::{Network, GAS_LIMIT, GAS_LIMIT_TX};
use crate::errors::Error;

/// The three assets the fleet moves around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Native gas currency.
    Fsn,
    Free,
    Fmn,
}

impl Token {
    pub fn is_native(self) -> bool {
        matches!(self, Token::Fsn)
    }

    /// ERC20 contract for this token, `None` for the native currency.
    pub fn contract(self, network: &Network) -> Option<Address> {
        match self {
            Token::Fsn => None,
            Token::Free => Some(network.free),
            Token::Fmn => Some(network.fmn),
        }
    }

    /// Gas limit of a single transfer of this token.
    pub fn transfer_gas_limit(self) -> u64 {
        if self.is_native() {
            GAS_LIMIT_TX
        } else {
            GAS_LIMIT
        }
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FSN" => Ok(Token::Fsn),
            "FREE" => Ok(Token::Free),
            "FMN" => Ok(Token::Fmn),
            _ => Err(Error::UnknownToken(s.to_string())),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Token::Fsn => "FSN",
            Token::Free => "FREE",
            Token::Fmn => "FMN",
        };
        f.write_str(name)
    }
}
