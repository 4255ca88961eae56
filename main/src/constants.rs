// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

/// The default endpoint for a local development node.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8545";

/// Name of the solc binary looked up on the PATH.
pub const DEFAULT_SOLC: &str = "solc";

/// Package directory searched for imports such as `@openzeppelin/...`.
pub const DEFAULT_INCLUDE_PATH: &str = "node_modules";

/// Key under which the source is submitted in the solc standard JSON input.
pub const SOURCE_KEY: &str = "contract.sol";

/// Where to get solc when it is not installed.
pub const SOLC_INSTALL_LINK: &str = "https://docs.soliditylang.org/en/latest/installing-solidity.html";

/// Responses endpoint used for security reviews.
pub const REVIEW_ENDPOINT: &str = "https://api.openai.com/v1/responses";

/// Model used for security reviews.
pub const REVIEW_MODEL: &str = "gpt-5-nano";

/// Upper bound on the length of a review.
pub const REVIEW_MAX_OUTPUT_TOKENS: u32 = 2000;

/// Explorer used for chains that are not in the network registry.
pub const DEFAULT_EXPLORER: &str = "https://etherscan.io";
