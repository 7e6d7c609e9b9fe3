//! # Passphrase Generator
//!
//! Article secrets are short phrases of science vocabulary so an author can
//! read them aloud or copy them by hand.

use rand::seq::SliceRandom;
use zeroize::Zeroizing;

/// Words per generated passphrase.
pub const PASSPHRASE_WORDS: usize = 7;

/// Vocabulary. Every entry is a single lowercase word and appears once.
pub const WORDS: &[&str] = &[
    "organic", "molecule", "chemical", "chemist", "reaction", "inorganic", "biochemistry",
    "physics", "atom", "photochemistry", "biology", "electrochemistry", "alchemy", "polymerize",
    "distill", "solvate", "atomism", "hydrogen", "electronegativity", "thermochemistry",
    "femtochemistry", "radiochemistry", "immunochemistry", "science", "analytical", "ph",
    "geology", "physical", "geochemistry", "atomic", "mixture", "neurochemistry",
    "petrochemistry", "substance", "catalyze", "reform", "crack", "pharmacology", "allomerism",
    "catalyst", "alkalinize", "acceptor", "fluorocarbon", "saturate", "osmosis", "iodize",
    "alkalize", "fullerene", "stoichiometry", "covalent", "nuclear", "oxygen", "ion",
    "composition", "molecular", "radioactivity", "theory", "alloy", "laboratory", "phlogiston",
    "dissociation", "cosmochemistry", "carbon", "bond", "histochemistry", "intermolecular",
    "element", "physiology", "phytochemistry", "biophysics", "microbiology", "dioxide",
    "medicine", "bioengineering", "electron", "crystal", "radioactive", "energy",
    "spectroscopy", "surface", "arsenic", "sodium", "orbital", "liquid", "interaction",
    "glassware", "equation", "helium", "ferromagnetism", "matter", "millennia", "material",
    "world", "chemically", "stereochemistry", "phosphorus", "fire", "styrene", "air", "valent",
    "water", "chain", "sublimation", "migration", "purify", "valence", "extract", "negativity",
    "react", "buffer", "attenuate", "dissociate", "decompose", "nitrate", "scavenge", "suspend",
    "oxidize", "conjugate", "transmute", "convert", "indicator", "compound", "isolate",
    "sublimate", "accelerator", "emulsion", "radical", "group", "activity", "state",
    "abundance", "electrolysis", "displacement", "decomposition", "association", "absorption",
    "dimorphism", "polymorphism", "ring", "acyclic", "democritus", "epicurus", "oxidation",
    "oleochemistry", "macrochemistry", "glycochemistry", "piezochemistry", "solution",
    "magnetochemistry", "monovalent", "spectrochemistry", "unsaturated", "trivalent",
    "coenzyme", "polyvalent", "amine", "alchemical", "carboxyl", "reversibly", "polymer",
    "platinum", "monomer", "isomer", "carbonyl", "bivalent", "tetrachloride", "dimer",
    "isomeric", "aryl", "diazo", "foryml", "alkalise", "acidify", "resublime", "imbibition",
    "carburise", "copolymerize", "butylate", "alkaline", "diene", "oxide", "aliphatic",
    "substituent", "azo", "ligand", "amphoteric", "hexafluoride", "thiol", "psychology",
    "ketone", "iodide", "aldehyde", "monoxide", "unreactive", "heterocyclic", "bromine", "urea",
    "peroxide", "trioxide", "theoretical", "degree", "nitrogen", "bimolecular", "carbocyclic",
    "halogenation", "cyclohexene", "heteroallene", "etherify", "halogenated", "sulfone",
    "hexacid", "allene", "monoterpene", "dinitrogen", "trichloride", "delocalization",
    "hexabromide", "diterpene", "halomethane", "diiodide", "triterpene", "monochloride",
    "tribromide", "trifluoride", "adsorb", "furan", "sesterterpene", "computational",
    "monoarsenide", "research", "vinylene", "entropy", "lab", "halohydrin", "delocalize",
    "structure", "cyanohydrin", "covalence", "chromatography", "applied", "experimental",
    "salt", "protons", "hydroxide", "acetylene", "metal",
];

/// Draw [`PASSPHRASE_WORDS`] words uniformly (with replacement) and join them
/// with single spaces.
pub fn generate_passphrase() -> Zeroizing<String> {
    let mut rng = rand::thread_rng();
    let words: Vec<&str> = (0..PASSPHRASE_WORDS)
        .filter_map(|_| WORDS.choose(&mut rng).copied())
        .collect();
    Zeroizing::new(words.join(" "))
}
