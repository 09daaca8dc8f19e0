use anyhow::Result;

use crate::grpcurl::Grpcurl;
use crate::util::{color_enabled_stdout, sym_check, sym_cross};

/// Report which execution paths are available on this machine.
pub fn handle_check() -> Result<()> {
    let color = color_enabled_stdout();
    let grpcurl = Grpcurl::new(false).installed();
    let docker = Grpcurl::new(true).installed();

    if grpcurl {
        println!("{} grpcurl found on PATH", sym_check(color));
    } else {
        println!("{} grpcurl not found on PATH", sym_cross(color));
    }
    if docker {
        println!("{} docker found on PATH (--docker available)", sym_check(color));
    } else {
        println!("{} docker not found on PATH", sym_cross(color));
    }

    if !grpcurl && !docker {
        anyhow::bail!(
            "neither grpcurl nor docker is installed; see https://github.com/fullstorydev/grpcurl"
        );
    }
    Ok(())
}
