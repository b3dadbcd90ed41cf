//! Fits the standalone linear regression model to a sensor calibration
//! curve (input voltage to degrees Celsius) and prints a few predictions.

use tinynn::nn::lin_reg::LinReg;

fn main() {
    env_logger::init();

    // Calibration pairs following temp = 100 * voltage - 50.
    let voltages = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let temperatures = [-50.0, 50.0, 150.0, 250.0, 350.0, 450.0];

    let mut model = LinReg::new(&voltages, &temperatures);
    model.train(10_000, 0.01).expect("training should run");

    println!(
        "fitted model: temp = {:.3} * voltage + {:.3}",
        model.weight(),
        model.bias()
    );

    for voltage in [0.5, 2.5, 4.2] {
        println!("{voltage:.1} V -> {:.1} deg C", model.predict(voltage));
    }
}
