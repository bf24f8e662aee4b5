use std::path::PathBuf;

use clap::{builder::RangedU64ValueParser, Parser};

use promoter_extract::{
    batch::BatchSettings,
    coords::Grammar,
    registry::NameRule,
};

/// Extract upstream promoter windows for CDS starts on circular genomes
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// a FASTA-formatted file of complete (circular) genomes
    #[arg(value_name = "GENOME_FASTA", required = true)]
    genomes: PathBuf,

    /// a coordinate file with one '>'-prefixed CDS header per line
    #[arg(value_name = "COORDS", required = true)]
    coords: PathBuf,

    /// output to this location (default is stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// number of bases upstream of each CDS start to extract
    #[arg(
        short,
        long,
        default_value_t = 100,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    window_len: usize,

    /// layout of the coordinate headers
    #[arg(short, long, value_enum, default_value_t = Grammar::Homer)]
    grammar: Grammar,

    /// genome names are the part of each FASTA identifier before this character
    #[arg(short = 'd', long, default_value_t = '_', conflicts_with = "whole_id")]
    id_delimiter: char,

    /// use each FASTA identifier unchanged as the genome name
    #[arg(long)]
    whole_id: bool,
}

impl Cli {
    pub fn get_input(&self) -> (PathBuf, PathBuf) {
        (self.genomes.clone(), self.coords.clone())
    }

    pub fn get_output(&self) -> Option<PathBuf> {
        self.output.clone()
    }

    pub fn settings(&self) -> BatchSettings {
        BatchSettings {
            window_len: self.window_len,
            grammar: self.grammar,
        }
    }

    pub fn name_rule(&self) -> NameRule {
        if self.whole_id {
            NameRule::Whole
        } else {
            NameRule::Prefix(self.id_delimiter)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["promoter-extract", "genomes.fa", "homer.txt"]);
        assert_eq!(
            cli.get_input(),
            (PathBuf::from("genomes.fa"), PathBuf::from("homer.txt"))
        );
        assert_eq!(cli.get_output(), None);
        assert_eq!(cli.settings(), BatchSettings::default());
        assert_eq!(cli.name_rule(), NameRule::Prefix('_'));
    }

    #[test]
    fn options() {
        let cli = Cli::parse_from([
            "promoter-extract",
            "genomes.fa",
            "cat.txt",
            "-o",
            "out.fa",
            "-w",
            "500",
            "-g",
            "range",
            "--whole-id",
        ]);
        assert_eq!(cli.get_output(), Some(PathBuf::from("out.fa")));
        assert_eq!(
            cli.settings(),
            BatchSettings {
                window_len: 500,
                grammar: Grammar::Range,
            }
        );
        assert_eq!(cli.name_rule(), NameRule::Whole);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(Cli::try_parse_from(["promoter-extract", "g.fa", "c.txt", "-w", "0"]).is_err());
    }
}
