use std::{env, fs};

use anyhow::Context;
use log::info;
use rand::{SeedableRng, rngs::StdRng};

use mlpcore::{
    Network,
    config::{DatasetConfig, TrainingConfig},
    dataset::Dataset,
    training::Trainer,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = match env::args().nth(1) {
        Some(path) => {
            let json =
                fs::read_to_string(&path).with_context(|| format!("cannot read '{path}'"))?;
            TrainingConfig::from_json(&json)
                .with_context(|| format!("invalid config '{path}'"))?
        }
        None => TrainingConfig::default(),
    };

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut net = Network::configure(&config.layers, config.act_fn.into())
        .context("failed to configure the network")?;
    net.init_weights(config.weight_range, &mut rng)?;

    let DatasetConfig { data, x_size, y_size } = &config.dataset;
    let mut dataset = Dataset::new(data, *x_size, *y_size).context("invalid dataset")?;

    info!(layers:? = net.layer_sizes(), samples = dataset.len(); "training");
    let trainer = Trainer::new(config.epochs, config.learning_rate).shuffle(config.shuffle);
    trainer.train(&mut net, &mut dataset, &mut rng)?;

    let mut total = 0.;
    for (x, y) in dataset.samples() {
        let y_pred = net.predict(x)?;
        let error: f64 = y_pred.iter().zip(y).map(|(p, t)| (p - t).powi(2)).sum();
        total += error;

        println!("in = {x:?}, out = {y_pred:.6?}, expected = {y:?}, error = {error:.6}");
    }

    println!("\nTotal error = {total:.10}\n");
    print!("{net}");

    net.release();
    Ok(())
}
