use clap::Parser;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::fs::File;
use std::io::{BufWriter, Write};

const STATES: [&str; 8] = ["SP", "RJ", "MG", "BA", "RS", "PE", "AM", "DF"];
const ROLES: [&str; 4] = ["vereador", "deputado federal", "deputado estadual", "prefeito"];
const GENDERS: [&str; 2] = ["feminino", "masculino"];
const EDUCATION: [&str; 5] = [
    "le e escreve",
    "ensino fundamental completo",
    "ensino medio completo",
    "superior incompleto",
    "superior completo",
];
const OCCUPATIONS: [&str; 6] = [
    "advogado",
    "comerciante",
    "empresario",
    "professor de ensino medio",
    "agricultor",
    "servidor publico municipal",
];
const RACES: [&str; 5] = ["branca", "parda", "preta", "amarela", "indigena"];

/// Writes a synthetic candidate CSV
#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Output file
    #[arg(default_value = "data/candidatos.csv")]
    outfile: String,
    /// Number of rows
    #[arg(short, long, default_value_t = 100_000)]
    rows: usize,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    let file = File::create(&args.outfile)?;
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "ano,tipo_eleicao,sigla_uf,cargo,idade,genero,instrucao,ocupacao,raca"
    )?;

    let mut rng = rand::rng();
    for _ in 0..args.rows {
        let year = [2018, 2020, 2022][rng.random_range(0..3)];
        let election = if rng.random_bool(0.98) {
            "eleicao ordinaria"
        } else {
            "eleicao suplementar"
        };
        // a thin tail of very old candidates
        let age = if rng.random_bool(0.01) {
            rng.random_range(80..100)
        } else {
            rng.random_range(21..75)
        };
        let gender = if rng.random_bool(0.33) { GENDERS[0] } else { GENDERS[1] };
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{},{}",
            year,
            election,
            STATES.choose(&mut rng).unwrap_or(&"SP"),
            ROLES.choose(&mut rng).unwrap_or(&"vereador"),
            age,
            gender,
            EDUCATION.choose(&mut rng).unwrap_or(&"superior completo"),
            OCCUPATIONS.choose(&mut rng).unwrap_or(&"advogado"),
            RACES.choose(&mut rng).unwrap_or(&"parda"),
        )?;
    }
    writer.flush()?;

    println!("Sample CSV generated: {}", args.outfile);
    Ok(())
}
