//! PKI initialization.

use std::io::Write;
use std::net::IpAddr;

use ipnet::IpNet;
use tracing::debug;
use wgmgr_pki::{InitParams, OsKeyService, PkiEngine, PkiError, PkiStore};

use crate::cli::InitArgs;
use crate::error::CliError;
use crate::output::{OutputFormat, ServerSummary};
use crate::target::Target;

/// Handler for `init`.
pub struct InitCommand<'a> {
    target: &'a Target,
}

impl<'a> InitCommand<'a> {
    /// Creates a new init command handler.
    #[must_use]
    pub const fn new(target: &'a Target) -> Self {
        Self { target }
    }

    /// Creates the server identity. With `force` any existing PKI is
    /// discarded first.
    ///
    /// # Errors
    ///
    /// Returns error if the arguments are invalid, the PKI already exists and
    /// `force` is not set, or the PKI cannot be saved.
    pub fn execute<W: Write>(
        &self,
        out: &mut W,
        format: &OutputFormat,
        args: &InitArgs,
        force: bool,
    ) -> Result<(), CliError> {
        let params = Self::params(args)?;
        debug!(pki = %self.target, force, "initializing PKI");

        let init = |store: &mut PkiStore| {
            PkiEngine::apply(store, OsKeyService, |engine| {
                engine.init(params).map(ServerSummary::from)
            })
        };
        let summary = if force {
            self.target.replace(init)?
        } else {
            self.target.transact(init)?
        };

        format.write(out, &summary)
    }

    fn params(args: &InitArgs) -> Result<InitParams, PkiError> {
        let network: IpNet = args
            .network
            .parse()
            .map_err(|_| PkiError::InvalidNetwork(format!("not a CIDR network: {}", args.network)))?;
        let address: IpAddr = args
            .address
            .parse()
            .map_err(|_| PkiError::InvalidNetwork(format!("not an IP address: {}", args.address)))?;

        Ok(InitParams::new(network, address, args.endpoint.as_str())
            .with_name(args.name.as_str())
            .with_description(args.description.as_str())
            .with_psk(args.psk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(network: &str, address: &str) -> InitArgs {
        InitArgs {
            network: network.into(),
            address: address.into(),
            endpoint: "vpn.example.com:51820".into(),
            name: "dev0".into(),
            description: "home net".into(),
            psk: true,
        }
    }

    #[test]
    fn params_carry_all_arguments() {
        let params = InitCommand::params(&args("10.0.0.0/24", "10.0.0.1")).expect("params");
        assert_eq!(params.network.to_string(), "10.0.0.0/24");
        assert_eq!(params.address.to_string(), "10.0.0.1");
        assert_eq!(params.name, "dev0");
        assert_eq!(params.description, "home net");
        assert!(params.generate_psk);
    }

    #[test]
    fn unparsable_network_is_invalid_network() {
        let err = InitCommand::params(&args("10.0.0.0/33", "10.0.0.1")).expect_err("bad prefix");
        assert!(matches!(err, PkiError::InvalidNetwork(_)));
        let err = InitCommand::params(&args("10.0.0.0/24", "ten")).expect_err("bad address");
        assert!(matches!(err, PkiError::InvalidNetwork(_)));
    }
}
