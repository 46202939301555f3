//! Formula-level linear models.

use super::error::ModelError;
use super::tables::{
    BandRequest, CoefficientRow, CoefficientTable, IntervalRow, IntervalTable, Level, PredictionBounds,
    PredictionTable,
};
use crate::core::{Dataset, IntervalType, NaHandler, RegressionOptions, RegressionResult};
use crate::design::{evaluate, DesignMatrix, EncodingCache, EvalMode, FactorLevels};
use crate::inference::CoefficientInference;
use crate::solvers::{gaussian_log_likelihood, FittedOls, FittedRegressor, OlsRegressor, Regressor};
use crate::terms::Expr;
use faer::Col;
use std::fmt;

/// Name of the intercept coefficient.
pub const INTERCEPT: &str = "Intercept";

/// An unfitted linear model `response ~ explanatory`.
///
/// The model is an intercept model when the explanatory expression holds a
/// non-zero constant or when [`RegressionOptions::with_intercept`] is set.
///
/// # Example
///
/// ```
/// use linmod::core::Dataset;
/// use linmod::model::LinearModel;
/// use linmod::terms::var;
///
/// let data = Dataset::builder()
///     .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])
///     .numeric("y", vec![2.0, 4.0, 6.0, 8.0, 10.0])
///     .build()
///     .unwrap();
///
/// let fitted = LinearModel::new(var("x"), var("y")).fit(&data).unwrap();
/// assert!((fitted.coefficient("x").unwrap() - 2.0).abs() < 1e-10);
/// assert!((fitted.result().r_squared - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    explanatory: Expr,
    response: Expr,
    options: RegressionOptions,
}

impl LinearModel {
    pub fn new(explanatory: impl Into<Expr>, response: impl Into<Expr>) -> Self {
        Self {
            explanatory: explanatory.into(),
            response: response.into(),
            options: RegressionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RegressionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn explanatory(&self) -> &Expr {
        &self.explanatory
    }

    pub fn response(&self) -> &Expr {
        &self.response
    }

    pub fn options(&self) -> &RegressionOptions {
        &self.options
    }

    /// Whether a fit of this model estimates an intercept.
    pub fn has_intercept(&self) -> bool {
        self.options.with_intercept || self.explanatory.constant().is_some()
    }

    /// Fit the model by ordinary least squares.
    ///
    /// Rows with missing values in any referenced numeric column are handled
    /// by the configured [`NaAction`](crate::core::NaAction) first. The model
    /// itself is left untouched; every fitted artifact lives in the result.
    pub fn fit(&self, data: &Dataset) -> Result<FittedLinearModel, ModelError> {
        self.options.validate()?;

        let span = tracing::debug_span!("fit", model = %self);
        let _enter = span.enter();

        let mut variables = self.explanatory.variables();
        for name in self.response.variables() {
            if !variables.contains(&name) {
                variables.push(name);
            }
        }
        let columns: Vec<&str> = variables.iter().map(String::as_str).collect();
        let (clean, na_info) = NaHandler::process(data, &columns, self.options.na_action)?;

        let explanatory = self.explanatory.interpret(&clean)?;
        let response = self.response.interpret(&clean)?;
        let has_intercept = self.has_intercept();

        let mut cache = EncodingCache::default();
        let design = evaluate(
            &Expr::from_terms(explanatory.non_constant_terms()),
            &clean,
            &mut EvalMode::Fit(&mut cache),
        )?;
        let response_design = evaluate(&response, &clean, &mut EvalMode::Fit(&mut cache))?;
        let response_names = response_design.names.clone();
        let response_values = single_column(response_design)?;

        let options = RegressionOptions {
            with_intercept: has_intercept,
            ..self.options.clone()
        };
        let ols = OlsRegressor::new(options)
            .fit(&design.values, &response_values)?
            .with_na_info(na_info);

        let result = ols.result();
        tracing::debug!(
            n = result.n_observations,
            p = result.n_parameters,
            sse = result.sse,
            r_squared = result.r_squared,
            "fit complete"
        );

        Ok(FittedLinearModel {
            model: self.clone(),
            explanatory,
            response,
            has_intercept,
            cache,
            design,
            response_names,
            response_values,
            ols,
            data: clean,
        })
    }
}

impl fmt::Display for LinearModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.options.with_intercept && self.explanatory.constant().is_none() {
            let terms = self.explanatory.terms();
            if terms.is_empty() {
                write!(f, "{} ~ 1", self.response)
            } else {
                write!(f, "{} ~ 1 + {}", self.response, self.explanatory)
            }
        } else {
            write!(f, "{} ~ {}", self.response, self.explanatory)
        }
    }
}

fn single_column(matrix: DesignMatrix) -> Result<Col<f64>, ModelError> {
    if matrix.ncols() != 1 {
        return Err(ModelError::MultiColumnResponse {
            columns: matrix.ncols(),
        });
    }
    Ok(matrix.column(0))
}

/// A fitted linear model.
///
/// Holds the interpreted expressions, the categorical levels resolved during
/// the fit, and the training design. Predictions replay those levels.
#[derive(Debug, Clone)]
pub struct FittedLinearModel {
    model: LinearModel,
    explanatory: Expr,
    response: Expr,
    has_intercept: bool,
    cache: EncodingCache,
    design: DesignMatrix,
    response_names: Vec<String>,
    response_values: Col<f64>,
    ols: FittedOls,
    data: Dataset,
}

impl FittedLinearModel {
    /// The model this fit came from.
    pub fn model(&self) -> &LinearModel {
        &self.model
    }

    /// Explanatory expression with every variable resolved.
    pub fn explanatory(&self) -> &Expr {
        &self.explanatory
    }

    /// Response expression with every variable resolved.
    pub fn response(&self) -> &Expr {
        &self.response
    }

    pub fn has_intercept(&self) -> bool {
        self.has_intercept
    }

    pub fn result(&self) -> &RegressionResult {
        self.ols.result()
    }

    pub fn ols(&self) -> &FittedOls {
        &self.ols
    }

    /// Training design matrix, without the intercept column.
    pub fn design(&self) -> &DesignMatrix {
        &self.design
    }

    /// Training response on the transformed scale.
    pub fn response_values(&self) -> &Col<f64> {
        &self.response_values
    }

    pub fn encoding_cache(&self) -> &EncodingCache {
        &self.cache
    }

    /// Levels resolved for a categorical column during the fit.
    pub fn levels(&self, column: &str) -> Option<&FactorLevels> {
        self.cache.levels_for_column(column)
    }

    /// Training rows that survived missing value handling.
    pub fn training_data(&self) -> &Dataset {
        &self.data
    }

    /// Coefficient names, `Intercept` first when present.
    pub fn coefficient_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.design.ncols() + 1);
        if self.has_intercept {
            names.push(INTERCEPT.to_string());
        }
        names.extend(self.design.names.iter().cloned());
        names
    }

    /// Estimates in [`coefficient_names`](Self::coefficient_names) order.
    pub fn coefficients(&self) -> Vec<f64> {
        let result = self.result();
        result
            .intercept
            .into_iter()
            .chain(result.coefficients.iter().copied())
            .collect()
    }

    pub fn coefficient(&self, name: &str) -> Option<f64> {
        let position = self.coefficient_names().iter().position(|n| n == name)?;
        self.coefficients().get(position).copied()
    }

    /// Estimates, standard errors, t and p values and confidence bounds.
    pub fn coefficient_table(&self) -> CoefficientTable {
        let result = self.result();
        let intercept_only = self.design.ncols() == 0;

        let mut rows = Vec::with_capacity(result.n_parameters);
        if let Some(intercept) = result.intercept {
            let bounds = result.intercept_conf_interval.filter(|_| !intercept_only);
            rows.push(CoefficientRow {
                name: INTERCEPT.to_string(),
                estimate: intercept,
                std_error: result.intercept_std_error.unwrap_or(f64::NAN),
                t_statistic: result.intercept_t_statistic.unwrap_or(f64::NAN),
                p_value: result.intercept_p_value.unwrap_or(f64::NAN),
                lower: bounds.map(|(lower, _)| lower),
                upper: bounds.map(|(_, upper)| upper),
            });
        }
        for (j, name) in self.design.names.iter().enumerate() {
            rows.push(CoefficientRow {
                name: name.clone(),
                estimate: result.coefficients[j],
                std_error: result.std_errors[j],
                t_statistic: result.t_statistics[j],
                p_value: result.p_values[j],
                lower: Some(result.conf_interval_lower[j]),
                upper: Some(result.conf_interval_upper[j]),
            });
        }

        CoefficientTable {
            rows,
            confidence_level: result.confidence_level,
        }
    }

    /// Coefficient confidence intervals at `level`.
    pub fn confidence_intervals(&self, level: impl Into<Level>) -> Result<IntervalTable, ModelError> {
        let level = level.into();
        level.validate()?;

        let result = self.result();
        let t_crit = CoefficientInference::t_critical(result.residual_df() as f64, level.confidence());
        let std_errors = CoefficientInference::standard_errors(&result.covariance, 0);

        let rows = self
            .coefficient_names()
            .into_iter()
            .zip(self.coefficients())
            .enumerate()
            .map(|(j, (name, estimate))| IntervalRow {
                name,
                lower: estimate - t_crit * std_errors[j],
                upper: estimate + t_crit * std_errors[j],
            })
            .collect();

        let (lower_label, upper_label) = level.bound_labels();
        Ok(IntervalTable {
            lower_label,
            upper_label,
            rows,
        })
    }

    /// Design matrix of new data, in the fitted column order.
    ///
    /// Columns the new data does not produce are zero.
    pub fn design_for(&self, data: &Dataset) -> Result<DesignMatrix, ModelError> {
        let terms = Expr::from_terms(self.explanatory.non_constant_terms());
        let design = evaluate(&terms, data, &mut EvalMode::Predict(&self.cache))?;
        Ok(design.align(&self.design.names))
    }

    /// Response of new data on the transformed scale, in the fitted column layout.
    pub fn response_for(&self, data: &Dataset) -> Result<Col<f64>, ModelError> {
        let response = evaluate(&self.response, data, &mut EvalMode::Predict(&self.cache))?;
        single_column(response.align(&self.response_names))
    }

    /// Label of prediction columns, `Predicted <response>`.
    pub fn prediction_label(&self) -> String {
        format!("Predicted {}", self.response)
    }

    /// Point predictions for new data.
    pub fn predict(&self, data: &Dataset) -> Result<PredictionTable, ModelError> {
        self.predict_bands(data, &BandRequest::default())
    }

    /// Predictions with a pointwise confidence or prediction band.
    pub fn predict_with_interval(
        &self,
        data: &Dataset,
        interval: IntervalType,
        level: impl Into<Level>,
    ) -> Result<PredictionTable, ModelError> {
        let request = match interval {
            IntervalType::Confidence => BandRequest::confidence(level),
            IntervalType::Prediction => BandRequest::prediction(level),
        };
        self.predict_bands(data, &request)
    }

    /// Predictions with the band described by `request`.
    pub fn predict_bands(&self, data: &Dataset, request: &BandRequest) -> Result<PredictionTable, ModelError> {
        let kind = match (request.confidence, request.prediction) {
            (true, true) => return Err(ModelError::ConflictingBands),
            (true, false) => Some(IntervalType::Confidence),
            (false, true) => Some(IntervalType::Prediction),
            (false, false) => None,
        };

        let x = self.design_for(data)?;
        let label = self.prediction_label();

        let Some(kind) = kind else {
            return Ok(PredictionTable {
                label,
                fit: self.ols.predict(&x.values).iter().copied().collect(),
                bounds: None,
            });
        };

        request.level.validate()?;
        let band = self
            .ols
            .predict_with_band(&x.values, kind, request.level.confidence(), request.method);
        let (lower_label, upper_label) = request.level.bound_labels();

        Ok(PredictionTable {
            label,
            fit: band.fit.iter().copied().collect(),
            bounds: Some(PredictionBounds {
                lower_label,
                upper_label,
                lower: band.lower.iter().copied().collect(),
                upper: band.upper.iter().copied().collect(),
                kind,
                method: request.method,
            }),
        })
    }

    /// R² of the fitted coefficients on new data.
    pub fn score(&self, data: &Dataset) -> Result<f64, ModelError> {
        let x = self.design_for(data)?;
        let y = self.response_for(data)?;
        Ok(self.ols.score(&x.values, &y))
    }

    /// Gaussian log-likelihood on the training data, or on `data` with the
    /// fitted variance estimate.
    pub fn log_likelihood(&self, data: Option<&Dataset>) -> Result<f64, ModelError> {
        let Some(data) = data else {
            return Ok(self.result().log_likelihood);
        };
        let x = self.design_for(data)?;
        let y = self.response_for(data)?;
        let predictions = self.ols.predict(&x.values);
        let sse: f64 = y
            .iter()
            .zip(predictions.iter())
            .map(|(&yi, &pi)| (yi - pi).powi(2))
            .sum();
        Ok(gaussian_log_likelihood(sse, y.nrows(), self.result().mse))
    }

    /// Fit another explanatory expression on the same training rows, response
    /// and intercept.
    pub fn refit(&self, explanatory: impl Into<Expr>) -> Result<FittedLinearModel, ModelError> {
        let options = RegressionOptions {
            with_intercept: self.has_intercept,
            ..self.model.options.clone()
        };
        LinearModel::new(explanatory, self.response.clone())
            .with_options(options)
            .fit(&self.data)
    }

    /// Map values on the response scale back through the response transformation.
    pub fn untransform_response(&self, values: &Col<f64>) -> Col<f64> {
        Col::from_fn(values.nrows(), |i| self.response.untransform(values[i]))
    }

    /// Name of the response on the raw scale, e.g. `y` for `log(y)`.
    pub fn untransform_name(&self) -> String {
        self.response.untransform_name()
    }
}

impl fmt::Display for FittedLinearModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.model, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::NaAction;
    use crate::terms::{cat, constant, quant, var, Transformable};

    fn line() -> Dataset {
        Dataset::builder()
            .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .numeric("y", vec![2.0, 4.0, 6.0, 8.0, 10.0])
            .build()
            .unwrap()
    }

    #[test]
    fn test_exact_line() {
        let fitted = LinearModel::new(var("x"), var("y")).fit(&line()).unwrap();

        assert_eq!(fitted.coefficient_names(), vec!["Intercept", "x"]);
        assert!(fitted.coefficient("Intercept").unwrap().abs() < 1e-10);
        assert!((fitted.coefficient("x").unwrap() - 2.0).abs() < 1e-10);
        assert!((fitted.result().r_squared - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_explicit_constant_forces_intercept() {
        let model = LinearModel::new(constant(1.0) + quant("x"), quant("y"))
            .with_options(RegressionOptions::without_intercept());
        assert!(model.has_intercept());
        assert_eq!(model.to_string(), "y ~ 1 + x");

        let fitted = model.fit(&line()).unwrap();
        assert!(fitted.result().intercept.is_some());
    }

    #[test]
    fn test_no_intercept() {
        let model =
            LinearModel::new(quant("x"), quant("y")).with_options(RegressionOptions::without_intercept());
        let fitted = model.fit(&line()).unwrap();

        assert_eq!(fitted.coefficient_names(), vec!["x"]);
        assert!((fitted.coefficients()[0] - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_intercept_only_table_has_no_bounds() {
        let fitted = LinearModel::new(Expr::empty(), quant("y")).fit(&line()).unwrap();
        let table = fitted.coefficient_table();

        assert_eq!(table.names(), vec!["Intercept"]);
        let row = table.get("Intercept").unwrap();
        assert!((row.estimate - 6.0).abs() < 1e-10);
        assert!(row.lower.is_none() && row.upper.is_none());
    }

    #[test]
    fn test_multi_column_response_fails() {
        let data = Dataset::builder()
            .numeric("x", vec![1.0, 2.0, 3.0, 4.0])
            .numeric("a", vec![1.0, 2.0, 3.0, 5.0])
            .numeric("b", vec![0.0, 1.0, 0.0, 1.0])
            .build()
            .unwrap();
        let result = LinearModel::new(var("x"), var("a") + var("b")).fit(&data);
        assert!(matches!(result, Err(ModelError::MultiColumnResponse { columns: 2 })));

        let collapsed = LinearModel::new(var("x"), crate::terms::identity(var("a") + var("b"))).fit(&data);
        assert!(collapsed.is_ok());
    }

    #[test]
    fn test_predict_label_and_values() {
        let fitted = LinearModel::new(var("x"), var("y")).fit(&line()).unwrap();
        let new_data = Dataset::builder().numeric("x", vec![10.0]).build().unwrap();
        let table = fitted.predict(&new_data).unwrap();

        assert_eq!(table.label, "Predicted y");
        assert!((table.fit[0] - 20.0).abs() < 1e-9);
        assert!(table.bounds.is_none());
    }

    #[test]
    fn test_conflicting_bands() {
        let fitted = LinearModel::new(var("x"), var("y")).fit(&line()).unwrap();
        let request = BandRequest {
            confidence: true,
            prediction: true,
            ..Default::default()
        };
        let result = fitted.predict_bands(&line(), &request);
        assert!(matches!(result, Err(ModelError::ConflictingBands)));
    }

    #[test]
    fn test_categorical_levels_replayed() {
        let data = Dataset::builder()
            .categorical("g", ["a", "b", "c", "a", "b", "c"])
            .numeric("y", vec![1.0, 2.0, 3.0, 1.2, 2.2, 3.2])
            .build()
            .unwrap();
        let fitted = LinearModel::new(cat("g"), quant("y")).fit(&data).unwrap();
        assert_eq!(fitted.coefficient_names(), vec!["Intercept", "g::b", "g::c"]);
        assert_eq!(fitted.levels("g").unwrap().levels, vec!["a", "b", "c"]);

        let new_data = Dataset::builder().categorical("g", ["c", "a"]).build().unwrap();
        let table = fitted.predict(&new_data).unwrap();
        assert!((table.fit[0] - 3.1).abs() < 1e-10);
        assert!((table.fit[1] - 1.1).abs() < 1e-10);

        let unseen = Dataset::builder().categorical("g", ["d"]).build().unwrap();
        assert!(matches!(
            fitted.predict(&unseen),
            Err(ModelError::Design(crate::design::DesignError::UnknownLevel { .. }))
        ));
    }

    #[test]
    fn test_categorical_response_scores_on_training_data() {
        let data = Dataset::builder()
            .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .categorical("won", ["no", "no", "yes", "no", "yes", "yes"])
            .build()
            .unwrap();
        let fitted = LinearModel::new(quant("x"), cat("won")).fit(&data).unwrap();

        let score = fitted.score(&data).unwrap();
        assert!((score - fitted.result().r_squared).abs() < 1e-10);
        let log_likelihood = fitted.log_likelihood(Some(&data)).unwrap();
        assert!((log_likelihood - fitted.result().log_likelihood).abs() < 1e-9);

        let response = fitted.response_for(&data).unwrap();
        assert_eq!(response.nrows(), 6);
        assert_eq!(response[2], 1.0);
        assert_eq!(response[0], 0.0);
    }

    #[test]
    fn test_log_response_untransform() {
        let data = Dataset::builder()
            .numeric("x", vec![1.0, 2.0, 3.0, 4.0])
            .numeric("y", vec![1.0_f64.exp(), 2.0_f64.exp(), 3.0_f64.exp(), 4.0_f64.exp()])
            .build()
            .unwrap();
        let fitted = LinearModel::new(quant("x"), quant("y").log()).fit(&data).unwrap();

        assert_eq!(fitted.prediction_label(), "Predicted log(y)");
        assert_eq!(fitted.untransform_name(), "y");
        let raw = fitted.untransform_response(&fitted.result().fitted_values);
        assert!((raw[1] - 2.0_f64.exp()).abs() < 1e-8);
    }

    #[test]
    fn test_na_rows_dropped() {
        let data = Dataset::builder()
            .numeric("x", vec![1.0, 2.0, f64::NAN, 4.0, 5.0])
            .numeric("y", vec![2.0, 4.0, 6.0, 8.0, 10.0])
            .build()
            .unwrap();
        let fitted = LinearModel::new(var("x"), var("y")).fit(&data).unwrap();
        assert_eq!(fitted.result().n_observations, 4);
        assert_eq!(fitted.result().n_na_removed(), 1);

        let strict = LinearModel::new(var("x"), var("y")).with_options(
            RegressionOptions::builder()
                .na_action(NaAction::Fail)
                .build()
                .unwrap(),
        );
        assert!(matches!(strict.fit(&data), Err(ModelError::Na(_))));
    }

    #[test]
    fn test_confidence_intervals_labels() {
        let data = Dataset::builder()
            .numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .numeric("y", vec![1.1, 1.9, 3.2, 3.8, 5.1, 6.2])
            .build()
            .unwrap();
        let fitted = LinearModel::new(var("x"), var("y")).fit(&data).unwrap();
        let intervals = fitted.confidence_intervals(Level::Alpha(0.05)).unwrap();

        assert_eq!(intervals.lower_label, "2.5%");
        assert_eq!(intervals.upper_label, "97.5%");

        // Same level as the fit, so the bounds match the coefficient table
        let table = fitted.coefficient_table();
        let x = intervals.get("x").unwrap();
        assert!((x.lower - table.get("x").unwrap().lower.unwrap()).abs() < 1e-10);
        assert!(x.lower < x.upper);
    }
}
